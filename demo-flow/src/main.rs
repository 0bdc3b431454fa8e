use davinci_flow::{Collector, CollectorType, DaVinciClient, FlowConfig, Node};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Input = Lines<BufReader<Stdin>>;

enum Choice {
    Submit,
    Flow(String),
    ExternalIdp(String),
}

async fn prompt(input: &mut Input, label: &str) -> Result<String, Box<dyn std::error::Error>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("{label}: ").as_bytes()).await?;
    stdout.flush().await?;
    Ok(input.next_line().await?.unwrap_or_default())
}

fn option_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Asks for every collector that takes input, then for an action.
async fn fill_form(
    client: &mut DaVinciClient,
    input: &mut Input,
) -> Result<Choice, Box<dyn std::error::Error>> {
    let collectors: Vec<Collector> = client.collectors().to_vec();
    let mut actions = Vec::new();

    for collector in &collectors {
        match collector {
            Collector::SingleValueCollector(c) => {
                let answer = prompt(input, &c.output.label).await?;
                client.update(&c.id, Some(Value::String(answer)))?;
            }
            Collector::ValidatedSingleValueCollector(c) => loop {
                let answer = prompt(input, &c.output.label).await?;
                client.update(&c.id, Some(Value::String(answer)))?;
                let problems = client.validate(&c.id)?;
                if problems.is_empty() {
                    break;
                }
                println!("  {}", problems.join(", "));
            },
            Collector::MultiValueCollector(c) => {
                let values: Vec<String> =
                    c.output.options.iter().map(|o| option_text(&o.value)).collect();
                let label = format!("{} ({})", c.output.label, values.join("/"));
                let chosen = prompt(input, &label)
                    .await?
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_string()))
                    .collect();
                client.update(&c.id, Some(Value::Array(chosen)))?;
            }
            Collector::NoValueCollector(c) => println!("{}", c.output.label),
            Collector::ActionCollector(c) => {
                let choice = match c.collector_type {
                    CollectorType::SubmitCollector => continue,
                    CollectorType::IdpCollector => Choice::ExternalIdp(c.id.clone()),
                    _ => Choice::Flow(c.name.clone()),
                };
                actions.push((c.name.clone(), c.output.label.clone(), choice));
            }
            Collector::ObjectValueCollector(c) => {
                tracing::warn!("{:?} {} needs a device prompt, skipping", c.collector_type, c.id);
            }
        }
    }

    if actions.is_empty() {
        return Ok(Choice::Submit);
    }
    for (key, label, _) in &actions {
        println!("  [{key}] {label}");
    }
    let answer = prompt(input, "Action (empty to submit)").await?;
    Ok(actions
        .into_iter()
        .find(|(key, _, _)| *key == answer)
        .map(|(_, _, choice)| choice)
        .unwrap_or(Choice::Submit))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "davinci_flow=info,demo_flow=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = FlowConfig::from_env().map_err(|e| e.log())?;
    let mut client = DaVinciClient::new(config)?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    client.start(&[]).await?;

    loop {
        match client.node() {
            Node::Start => {
                tracing::error!("Flow did not leave the start node");
                break;
            }
            Node::Success(success) => {
                println!("Signed in. Session: {:?}", success.server.session);
                if let Some(authorization) = &success.authorization {
                    println!("Authorization code: {:?}", authorization.code);
                }
                break;
            }
            Node::Failure(failure) => {
                println!("Flow failed: {} ({})", failure.error.message, failure.error.code);
                break;
            }
            Node::Continue(_) | Node::Error(_) => {}
        }

        if let Some(error) = client.error() {
            println!("Error: {}", error.message);
            for detail in &error.collectors {
                println!("  {}: {}", detail.target, detail.message);
            }
        }
        if let Some(name) = client.node().client().and_then(|c| c.name.as_deref()) {
            println!("== {name} ==");
        }

        match fill_form(&mut client, &mut input).await? {
            Choice::Submit => {
                client.next().await?;
            }
            Choice::Flow(action_key) => {
                client.flow(&action_key).await?;
            }
            Choice::ExternalIdp(id) => {
                match client.prepare_external_idp(&id).await? {
                    Some(url) => println!("Continue in your browser: {url}"),
                    None => println!("The identity provider has no sign-in link"),
                }
                break;
            }
        }
    }

    Ok(())
}
