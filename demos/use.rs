use avlset::AvlSet;

fn main() {
    let mut set = AvlSet::new();
    for word in ["two", "zero", "four", "one", "three"] {
        set.insert(word.to_string());
    }
    let (position, inserted) = set.insert("two".to_string());
    assert!(!inserted);
    assert_eq!(position.get().map(String::as_str), Some("two"));

    assert!(set.contains("four"));
    assert_eq!(set.count("five"), 0);

    print!("{{ ");
    for word in &set {
        print!("{word}, ");
    }
    println!("}}");

    print!("descending: ");
    for word in set.iter().rev() {
        print!("{word} ");
    }
    println!();

    // Walk back from the end position, reporting where each node sits
    let mut cursor = set.cursor_end();
    cursor.move_prev();
    while let Some(word) = cursor.get() {
        println!(
            "{word:>5}: level {}, balance {:+}",
            cursor.height().unwrap_or(0),
            cursor.balance().unwrap_or(0)
        );
        cursor.move_prev();
    }

    let mut descending = AvlSet::with_comparator(|a: &u32, b: &u32| b.cmp(a));
    descending.extend([3, 1, 4, 1, 5, 9, 2, 6]);
    println!("{:?}", descending);
}
