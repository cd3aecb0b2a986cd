use anyhow::{Result, anyhow};
use nordic_guide::catalog;
use nordic_guide::init_tracing;
use nordic_guide::transcript::{ChatSession, ProxyEndpoint, Role};
use tokio::io::{AsyncBufReadExt, BufReader};

const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:8080/";

fn print_usage(program: &str) {
    println!("Usage:");
    println!(
        "  {} <CITY_ID> <ATTRACTION_ID> <QUESTION>   - Ask one question",
        program
    );
    println!(
        "  {} <CITY_ID> <ATTRACTION_ID>              - Ask questions read from stdin, one per line",
        program
    );
    println!("\nEnvironment:");
    println!("  GUIDE_PROXY_URL  proxy endpoint (default {})", DEFAULT_PROXY_URL);
    println!("  GUIDE_PROXY_KEY  hosting platform key sent as apikey/bearer token");
    println!("\nExamples:");
    println!("  {} oslo vigeland-park \"이 명소는 언제 방문하는 게 좋아요?\"", program);
    println!("  {} helsinki suomenlinna < questions.txt", program);
}

async fn ask(session: &mut ChatSession, question: &str) {
    match session.ask(question).await {
        Ok(reply) => println!("\n🧭 {}\n", reply.content),
        Err(e) => println!("⏭️  Skipped: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("nordic_guide=warn");

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        print_usage(&args[0]);
        return Ok(());
    }
    let (city_id, attraction_id) = (&args[1], &args[2]);

    let catalog = catalog::catalog()?;
    let attraction = catalog
        .attraction(city_id, attraction_id)
        .ok_or_else(|| anyhow!("Unknown attraction: {}/{}", city_id, attraction_id))?;

    let endpoint = ProxyEndpoint {
        url: std::env::var("GUIDE_PROXY_URL").unwrap_or_else(|_| DEFAULT_PROXY_URL.to_string()),
        auth_key: std::env::var("GUIDE_PROXY_KEY").ok(),
    };
    println!("📍 {} ({})", attraction.name, attraction.name_local);
    println!("Proxy: {}", endpoint.url);

    let mut session = ChatSession::new(
        reqwest::Client::new(),
        endpoint,
        attraction.context_string(),
    );

    if args.len() > 3 {
        let question = args[3..].join(" ");
        ask(&mut session, &question).await;
    } else {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            println!("❓ {}", line.trim());
            ask(&mut session, &line).await;
        }
    }

    let asked = session
        .transcript()
        .entries()
        .filter(|m| m.role == Role::User)
        .count();
    println!("{} question(s) asked", asked);
    Ok(())
}
