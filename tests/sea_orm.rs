use pretty_assertions::assert_eq;
use stringlens::prelude::*;
use stringlens::sea_orm::{translate_predicate, SeaOrmStore};

async fn store(values: &[&str]) -> SeaOrmStore {
    let store = SeaOrmStore::connect("sqlite::memory:").await.unwrap();
    for value in values {
        store.insert(AnalyzedRecord::new(*value)).await.unwrap();
    }
    store
}

fn values(records: Vec<AnalyzedRecord>) -> Vec<String> {
    records.into_iter().map(|r| r.value).collect()
}

#[tokio::test]
async fn test_insert_get() {
    let store = store(&["Hello, World!"]).await;

    let record = store.get("Hello, World!").await.unwrap().unwrap();
    assert_eq!(record.identifier, analyze("Hello, World!").hash);
    assert_eq!(record.properties, analyze("Hello, World!"));

    assert!(store.get("hello, world!").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate() {
    let store = store(&["hello"]).await;

    let result = store.insert(AnalyzedRecord::new("hello")).await;
    assert!(matches!(result, Err(StoreError::Conflict)));
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete() {
    let store = store(&["a", "b"]).await;

    store.delete("a").await.unwrap();
    assert!(store.get("a").await.unwrap().is_none());
    assert!(matches!(store.delete("a").await, Err(StoreError::NotFound)));
    assert_eq!(values(store.list().await.unwrap()), vec!["b"]);
}

#[tokio::test]
async fn test_find() {
    let store = store(&["racecar", "race car", "level up", "noon", "zz top"]).await;

    let found = store
        .find(&Predicate::parse("palindromes longer than 3 characters").unwrap())
        .await
        .unwrap();
    assert_eq!(values(found), vec!["racecar", "noon"]);

    let found = store
        .find(
            &FilterParams {
                word_count: Some(2),
                contains_character: Some("z".into()),
                ..Default::default()
            }
            .to_predicate()
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(values(found), vec!["zz top"]);
}

#[tokio::test]
async fn test_find_conflicting_bounds() {
    let store = store(&["a", "abc", "abcdef"]).await;

    let predicate = FilterParams {
        min_length: Some(5),
        max_length: Some(2),
        ..Default::default()
    }
    .to_predicate()
    .unwrap();

    assert!(store.find(&predicate).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_same_as_memory() {
    let inputs = ["", "a", "Anna", "step on no pets", "ünïcödé ✓✓", "  x  "];
    let sql = store(&inputs).await;
    let memory = MemoryStore::new();
    for value in inputs {
        memory.insert(AnalyzedRecord::new(value)).await.unwrap();
    }

    for phrase in [
        "palindromes",
        "strings with at least 2 words",
        "shorter than 5 characters",
        "strings containing the letter a",
        "non palindromic strings with 1 word",
    ] {
        let predicate = Predicate::parse(phrase).unwrap();
        let mut expected = values(memory.find(&predicate).await.unwrap());
        let mut actual = values(sql.find(&predicate).await.unwrap());
        expected.sort();
        actual.sort();

        assert_eq!(expected, actual, "phrase: {phrase}");
    }
}

#[test]
fn test_containment_is_not_pushed_down() {
    let with = Predicate::new()
        .and(Constraint::Palindrome(true))
        .and(Constraint::ContainsCharacter('x'));
    let without = Predicate::new().and(Constraint::Palindrome(true));

    assert_eq!(
        format!("{:?}", translate_predicate(&with)),
        format!("{:?}", translate_predicate(&without))
    );
}
