use rs_phrase_core::{EngineConfig, Overrides, PhraseEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug shows every loaded file and category
    env_logger::init();

    // Seed the random source to get the same phrases on every run
    // (leave it to 'None' to seed from the OS)
    let mut config = EngineConfig::default();
    config.seed = Some(2024);

    // Run every fragment once after loading and refuse broken grammars
    config.validate_on_load = true;

    // Give up on a query after this many rewrite cycles
    config.set_max_parse_cycles(2048)?;

    // Attempting to set an invalid cycle cap
    match config.set_max_parse_cycles(0) {
        Ok(_) => println!("Should not happen"),
        Err(_) => println!("A cycle cap of 0 is invalid, must be at least 1"),
    }

    // Load all grammar files listed in "./data/index.grammar"
    let mut app = PhraseEngine::from_manifest("./data", config)?;
    println!("Loaded categories: {}", app.grammar().names().collect::<Vec<_>>().join(", "));

    // Generate 10 observations
    for i in 0..10 {
        println!("Generated phrase {}: {}", i + 1, app.parse("[observation]")?);
    }

    // Tags can be written directly in the query too
    println!("{}", app.parse("[a] [colour] [animal] and [a] [tiny/huge] [animal#2]")?);

    // Overrides force the value of a category
    let overrides = Overrides::from([("animal".to_owned(), "owl".to_owned())]);
    println!("{}", app.parse_with("[!animal]the [animal] goes [[animal] sound]", &overrides)?);

    // The counter is an estimate: nested tags inside alternatives are not expanded
    let range = app.count_options("[a] [colour] [animal] [verb]")?;
    println!("Between {} and {} phrases", range.lower_bound, range.upper_bound);

    // Unknown categories are reported as errors, not panics
    match app.parse("[unicorn]") {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{e}"),
    }

    // Validation collects every problem instead of stopping at the first one
    let findings = app.validate();
    println!("{} validation finding(s)", findings.len());
    for finding in findings {
        println!("  {finding}");
    }

    Ok(())
}
