use stringlens::{filter, lir::Predicate, mir, parser};

fn main() {
    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    println!("Input: '{query}'");

    let phrase = parser::tokenize(&query).expect("Failed to tokenize");
    let tokens = phrase
        .tokens
        .iter()
        .map(|token| format!("[{token}]"))
        .collect::<Vec<_>>();
    println!("\nTokens:\n{}", tokens.join(" "));

    println!("\nRules:");
    for m in mir::translate(&phrase) {
        println!("  {:<28} @{:<3} {:?}", m.rule, m.position, m.constraint);
    }

    match Predicate::parse(&query) {
        Ok(predicate) => {
            println!("\nPredicate:\n{predicate:#?}");
            println!(
                "\nFilters:\n{}",
                serde_json::Value::Object(filter::describe(&predicate))
            );
        }
        Err(err) => println!("\n{err}"),
    }
}
