use matchday::{CatalogQuery, Config, Matchday, MatchSort};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> matchday::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let diary = Matchday::open(Config::from_env())?;
    let seeded = diary.seed_if_empty();
    println!("Seeded {seeded} matches");

    if diary.current_user().is_none() {
        match diary.sign_in("demo@example.com", "demo") {
            Ok(user) => println!("Signed in as {}", user.username),
            Err(_) => {
                let user = diary.register("demo", "demo@example.com", "demo")?;
                println!("Registered {}", user.username);
            }
        }
    }

    diary.rate_match(6, 5)?;
    diary.log_watched(6)?;
    if !diary.my_reviews()?.contains_key(&6) {
        diary.submit_review(6, 5, "The greatest comeback in Champions League history.")?;
    }

    println!("\nTrending");
    for m in diary.trending() {
        println!("  {} ({})", m.title(), m.date);
    }

    println!("\nTop rated");
    for m in diary.top_rated() {
        println!("  {} {}-{}", m.title(), m.score.home, m.score.away);
    }

    let finals = diary.search(&CatalogQuery::new().stage("Final").sort(MatchSort::Oldest));
    println!("\nFinals, oldest first");
    println!(
        "{}",
        serde_json::to_string_pretty(
            &finals.iter().map(|m| m.title()).collect::<Vec<_>>()
        )
        .unwrap_or_default()
    );

    println!("\n{:?}", diary.stats());
    Ok(())
}
