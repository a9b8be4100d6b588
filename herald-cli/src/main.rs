//! Herald CLI - run the content pipeline and its agents from the terminal

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use herald_core::cache::ResultCache;
use herald_core::prelude::*;
use herald_core::routing::QueryRequest;

#[derive(Parser)]
#[command(name = "herald")]
#[command(about = "Multi-agent content pipeline", long_about = None)]
#[command(version)]
struct Cli {
    /// Load only this configuration file instead of the layered lookup
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full workflow for a request
    Run {
        query: String,
        /// Earlier conversation turns, oldest first
        #[arg(long)]
        history: Vec<String>,
        /// Print the final state and trace as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify a request without running the workflow
    Analyze {
        query: String,
        #[arg(long)]
        history: Vec<String>,
    },
    /// Research a topic
    Research { topic: String },
    /// Credibility score of a statement
    Score { statement: String },
    /// Draft a content strategy for a topic
    Strategy { topic: String },
    /// Write a LinkedIn post
    Linkedin {
        topic: String,
        /// Adapt the saved blog post instead of starting from research
        #[arg(long)]
        from_saved_blog: bool,
    },
    /// Publish a post to LinkedIn
    Publish {
        /// Author URN, e.g. urn:li:person:abc123
        #[arg(long, env = "LINKEDIN_AUTHOR_URN")]
        author: String,
        /// Text to publish (defaults to the saved blog post)
        #[arg(long)]
        text: Option<String>,
    },
    /// LinkedIn OAuth helpers
    Oauth {
        #[command(subcommand)]
        command: OauthCommands,
    },
    /// Saved blog post
    Blog {
        #[command(subcommand)]
        command: BlogCommands,
    },
    /// Version information
    Version,
}

#[derive(Subcommand)]
enum OauthCommands {
    /// Print the authorization URL
    Url,
    /// Exchange an authorization code for an access token
    Exchange { code: String },
}

#[derive(Subcommand)]
enum BlogCommands {
    /// Print the saved blog post
    Show,
    /// Delete the saved blog post
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("herald {}", env!("CARGO_PKG_VERSION"));
        println!("herald-core {}", herald_core::VERSION);
        return Ok(());
    }
    if let Commands::Score { statement } = &cli.command {
        let fact = VerifiedFact::assess(statement.clone());
        println!("{:.1} ({})", fact.credibility_score, fact.status.as_str());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => HeraldConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => HeraldConfig::load().context("loading configuration")?,
    };
    let store = BlogStore::new(config.persistence.blog_file.clone());

    match cli.command {
        Commands::Version | Commands::Score { .. } => {}
        Commands::Run {
            query,
            history,
            json,
        } => {
            let orchestrator = ContentOrchestrator::from_config(&config)?;
            let run = orchestrator.run(&query, history).await?;

            if !run.state.blog_content.is_empty() {
                store.save(&run.state.blog_content).await?;
                tracing::info!(path = %store.path().display(), "blog saved");
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&run)?);
            } else {
                print_run(&run);
            }
        }
        Commands::Analyze { query, history } => {
            let llm = LLMProviderFactory::from_config(&config)?;
            let request = QueryRequest::new(query).with_history(history);
            let decision = IntentClassifier::new(llm).produce(&request).await?;
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
        Commands::Research { topic } => {
            let llm = LLMProviderFactory::from_config(&config)?;
            let record = ResearchAggregator::from_config(&config, llm)
                .research(&topic)
                .await?;

            println!("{}\n", record.summary);
            for fact in &record.verified_facts {
                println!(
                    "[{:.1} {}] {}",
                    fact.credibility_score,
                    fact.status.as_str(),
                    fact.fact
                );
            }
            if !record.sources.is_empty() {
                println!("\nSources:");
                for source in &record.sources {
                    println!("  {}", source);
                }
            }
        }
        Commands::Strategy { topic } => {
            let llm = LLMProviderFactory::from_config(&config)?;
            let record = ResearchAggregator::from_config(&config, llm.clone())
                .research(&topic)
                .await?;
            let context = ContentContext::new(topic).with_research(record.summary, record.insights);
            let strategy = ContentStrategistAgent::new(llm, config.temperature())
                .plan(&context)
                .await?;
            println!("{}", strategy.strategy);
        }
        Commands::Linkedin {
            topic,
            from_saved_blog,
        } => {
            let llm = LLMProviderFactory::from_config(&config)?;
            let mut context = ContentContext::new(topic);
            if from_saved_blog {
                let blog = store.load().await?;
                if blog.is_empty() {
                    bail!("no saved blog post in {}", store.path().display());
                }
                context = context.with_blog(blog);
            }

            let cache = Arc::new(ResultCache::new(config.cache.linkedin_capacity));
            let post = LinkedInWriterAgent::new(llm, config.temperature(), cache)
                .write(&context)
                .await?;
            match post.error {
                Some(error) => bail!("{}", error),
                None => println!("{}", post.content),
            }
        }
        Commands::Publish { author, text } => {
            let text = match text {
                Some(text) => text,
                None => store.load().await?,
            };
            if text.trim().is_empty() {
                bail!("nothing to publish: pass --text or run a blog request first");
            }

            let publisher = LinkedInPublisher::from_config(&config.linkedin, config.timeouts.publish);
            match publisher.publish(&text, &author).await {
                PublishOutcome::Published { message } => println!("{}", message),
                PublishOutcome::Failed { error } => bail!("LinkedIn publish failed: {}", error),
            }
        }
        Commands::Oauth { command } => {
            let oauth = LinkedInOAuth::from_config(&config.linkedin, config.timeouts.publish)?;
            match command {
                OauthCommands::Url => println!("{}", oauth.authorization_url()),
                OauthCommands::Exchange { code } => {
                    let token = oauth.exchange_code(&code).await?;
                    println!("{}", token.access_token);
                    if let Some(expires_in) = token.expires_in {
                        eprintln!("expires in {}s; export it as LINKEDIN_ACCESS_TOKEN", expires_in);
                    }
                }
            }
        }
        Commands::Blog { command } => match command {
            BlogCommands::Show => {
                let blog = store.load().await?;
                if blog.is_empty() {
                    eprintln!("no saved blog post");
                } else {
                    println!("{}", blog);
                }
            }
            BlogCommands::Clear => {
                store.clear().await?;
                println!("Cleared {}", store.path().display());
            }
        },
    }

    Ok(())
}

fn print_run(run: &WorkflowRun) {
    let state = &run.state;

    if !state.blog_content.is_empty() {
        println!("{}\n", state.blog_content);
    }
    if !state.linkedin_content.is_empty() {
        println!("--- LinkedIn ---\n{}\n", state.linkedin_content);
    }
    if !state.image_prompts.is_empty() {
        println!("--- Images ---");
        for (i, prompt) in state.image_prompts.iter().enumerate() {
            println!("{}. {}", i + 1, prompt);
        }
        for path in &state.generated_images {
            println!("   saved {}", path.display());
        }
        println!();
    }

    println!("--- Steps ---");
    for step in &state.processing_steps {
        println!("  {}", step);
    }

    if !state.key_insights.is_empty() {
        println!("--- Insights ---");
        for insight in &state.key_insights {
            println!("  • {}", insight);
        }
    }

    println!("--- Metrics ---");
    if let Some(seo) = state.seo_score {
        println!("  SEO score: {}", seo);
    }
    if let Some(readability) = state.readability_score {
        println!("  Readability: {:.1}", readability);
    }
    for (channel, score) in &state.content_quality_scores {
        println!("  Quality ({}): {}", channel, score);
    }
    if !state.keywords.is_empty() {
        println!("  Keywords: {}", state.keywords.join(", "));
    }
    println!("  Duration: {} ms", run.trace.total_duration_ms);

    for warning in &state.warnings {
        println!("warning: {}", warning);
    }
    for error in &state.errors {
        println!("error: {}", error);
    }
    println!(
        "{}",
        if state.success {
            "Workflow complete."
        } else {
            "Workflow finished with errors."
        }
    );
}
