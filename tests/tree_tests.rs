use radix_mutable::{Error, RadixTree};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_key_that_prefixes_another() {
    let mut tree = RadixTree::new();
    tree.insert("toast", 'A').unwrap();
    tree.insert("toaster", 'B').unwrap();

    assert_eq!(tree.get("toast"), Ok(&'A'));
    assert_eq!(tree.get("toaster"), Ok(&'B'));

    let view = tree.prefix("toa").unwrap();
    let keys: Vec<Vec<u8>> = view.keys().collect();
    assert_eq!(keys, vec![b"toast".to_vec(), b"toaster".to_vec()]);
    assert_eq!(tree.check_invariants(), Ok(()));
}

#[test]
fn test_branching_node_with_two_children() {
    let mut tree = RadixTree::new();
    tree.insert("car", 'A').unwrap();
    tree.insert("cart", 'B').unwrap();
    tree.insert("care", 'C').unwrap();

    assert_eq!(tree.get("car"), Ok(&'A'));
    assert_eq!(tree.get("cart"), Ok(&'B'));
    assert_eq!(tree.get("care"), Ok(&'C'));

    // One branching node "car" with the children "e" and "t"
    assert_eq!(
        tree.dump(),
        "<root> (1)\n  \"car\" (2) *\n    \"e\" (0) *\n    \"t\" (0) *\n"
    );
    assert_eq!(tree.check_invariants(), Ok(()));
}

#[test]
fn test_delete_from_branching_node() {
    let mut tree = RadixTree::new();
    tree.insert("car", 'A').unwrap();
    tree.insert("cart", 'B').unwrap();
    tree.insert("care", 'C').unwrap();

    tree.delete("cart").unwrap();

    assert_eq!(tree.get("cart"), Err(Error::NotFound));
    assert_eq!(tree.get("car"), Ok(&'A'));
    assert_eq!(tree.get("care"), Ok(&'C'));
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.check_invariants(), Ok(()));
    assert_eq!(tree.dump(), "<root> (1)\n  \"car\" (1) *\n    \"e\" (0) *\n");
}

#[test]
fn test_conflicting_insert() {
    let mut tree = RadixTree::new();
    tree.insert("dog", 'X').unwrap();

    assert_eq!(tree.insert("dog", 'Y'), Err(Error::KeyConflict));
    assert_eq!(tree.get("dog"), Ok(&'X'));
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_empty_tree_lookups() {
    let tree: RadixTree<char> = RadixTree::new();

    assert_eq!(tree.get("anything"), Err(Error::NotFound));
    assert_eq!(tree.prefix("anything").unwrap_err(), Error::NotFound);
    assert!(!tree.contains_key("anything"));
}

#[test]
fn test_prefix_only_match_is_not_deletable() {
    let mut tree = RadixTree::new();
    tree.insert("toaster", 1).unwrap();
    tree.insert("toasted", 2).unwrap();

    assert_eq!(tree.delete("toast"), Err(Error::NotFound));
    assert_eq!(tree.delete("to"), Err(Error::NotFound));
    assert_eq!(tree.delete("toasters"), Err(Error::NotFound));

    let keys: Vec<Vec<u8>> = tree.keys().collect();
    assert_eq!(keys, vec![b"toasted".to_vec(), b"toaster".to_vec()]);
    assert_eq!(tree.check_invariants(), Ok(()));
}

#[test]
fn test_delete_then_reinsert() {
    let mut tree = RadixTree::new();
    tree.insert("slow", 1).unwrap();
    tree.insert("slower", 2).unwrap();
    tree.insert("slowest", 3).unwrap();

    tree.delete("slow").unwrap();
    assert_eq!(tree.get("slow"), Err(Error::NotFound));
    assert_eq!(tree.check_invariants(), Ok(()));

    tree.insert("slow", 4).unwrap();
    assert_eq!(tree.get("slow"), Ok(&4));
    assert_eq!(tree.get("slower"), Ok(&2));
    assert_eq!(tree.get("slowest"), Ok(&3));
    assert_eq!(tree.check_invariants(), Ok(()));
}

#[test]
fn test_long_chain_of_prefixes() {
    // Every prefix of a long key is itself a key
    let key: Vec<u8> = (0..2000).map(|i| (i % 251) as u8).collect();
    let mut tree = RadixTree::new();
    for end in (1..=key.len()).rev() {
        tree.insert(&key[..end], end).unwrap();
    }
    assert_eq!(tree.len(), key.len());
    assert_eq!(tree.check_invariants(), Ok(()));

    for end in 1..=key.len() {
        assert_eq!(tree.get(&key[..end]), Ok(&end));
    }

    for end in 1..=key.len() {
        assert_eq!(tree.remove(&key[..end]), Ok(end));
    }
    assert!(tree.is_empty());
    assert_eq!(tree.check_invariants(), Ok(()));
}

#[test]
fn test_destroy_hook_sees_every_value_once() {
    let destroyed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&destroyed);
    let mut tree = RadixTree::with_destroy(move |value: String| sink.borrow_mut().push(value));

    for key in ["alpha", "alphabet", "alpine", "beta"] {
        tree.insert(key, key.to_uppercase()).unwrap();
    }
    tree.insert_or_replace("alpine", "ALPINE2".to_string()).unwrap();
    tree.delete("alpha").unwrap();
    drop(tree);

    let mut seen = destroyed.borrow().clone();
    seen.sort();
    assert_eq!(seen, vec!["ALPHA", "ALPHABET", "ALPINE", "ALPINE2", "BETA"]);
}

#[test]
fn test_invalid_key() {
    let mut tree = RadixTree::new();
    assert_eq!(tree.insert("", 1), Err(Error::InvalidKey));
    assert_eq!(tree.insert_or_replace(Vec::<u8>::new(), 1), Err(Error::InvalidKey));
    assert_eq!(tree.delete(""), Err(Error::NotFound));
    assert!(tree.is_empty());
}

#[test]
fn test_error_display() {
    assert_eq!(Error::KeyConflict.to_string(), "Key is already present");
    assert_eq!(Error::NotFound.to_string(), "Key not found");
    assert_eq!(Error::OutOfMemory.to_string(), "Out of memory");
}
