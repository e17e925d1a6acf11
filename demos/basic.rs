//! Examples of using the radix tree
use radix_mutable::{Error, RadixTree};

fn main() -> Result<(), Error> {
    // Values dropped by the tree go through the destroy hook
    let mut tree = RadixTree::with_destroy(|value: String| println!("destroyed {}", value));

    tree.insert("toast", "A".to_string())?;
    tree.insert("toaster", "B".to_string())?;
    tree.insert("toad", "C".to_string())?;

    // Check values
    assert_eq!(tree.get("toast").map(String::as_str), Ok("A"));
    assert_eq!(tree.get("toa"), Err(Error::NotFound));

    // Existing keys are only overwritten on request
    assert_eq!(tree.insert("toad", "D".to_string()), Err(Error::KeyConflict));
    tree.insert_or_replace("toad", "D".to_string())?;

    // Every key starting with "toas"
    let view = tree.prefix("toas")?;
    for (key, value) in &view {
        println!("{} => {}", String::from_utf8_lossy(&key), value);
    }

    tree.delete("toaster")?;
    print!("{}", tree.dump());

    Ok(())
}
