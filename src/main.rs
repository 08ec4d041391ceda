use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use nestegg::api::{PlanArgs, build_calculate_response, run_http_server};
use nestegg::core::{PlanError, PlanInputs, calculate, format_schedule, format_summary};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nestegg",
    version,
    about = "Year-by-year retirement savings projection"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Project a plan and print the summary and yearly schedule
    Calculate {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Re-run an unsustainable plan at its recommended retirement age
        #[arg(long)]
        use_recommended_age: bool,
    },
    /// Serve the projection HTTP API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Calculate {
            plan,
            format,
            use_recommended_age,
        } => run_calculate(plan, format, use_recommended_age),
        Command::Serve { port } => match run_http_server(port).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Server error: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run_calculate(plan: PlanArgs, format: OutputFormat, use_recommended_age: bool) -> ExitCode {
    let mut params = match PlanInputs::from(plan).into_params() {
        Ok(params) => params,
        Err(err) => return report_plan_error(&err.into()),
    };

    let mut result = match calculate(&params) {
        Ok(result) => result,
        Err(err) => return report_plan_error(&err),
    };

    if use_recommended_age && !result.is_self_sustaining {
        params = params.with_retirement_age(result.recommended_age);
        result = match calculate(&params) {
            Ok(result) => result,
            Err(err) => return report_plan_error(&err),
        };
    }

    match format {
        OutputFormat::Text => {
            println!("{}", format_summary(&result));
            println!();
            println!("{}", format_schedule(&result.years));
        }
        OutputFormat::Json => {
            let response = build_calculate_response(&params, result);
            match serde_json::to_string_pretty(&response) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
    }
    ExitCode::SUCCESS
}

fn report_plan_error(err: &PlanError) -> ExitCode {
    match err {
        PlanError::Validation(err) => {
            for violation in err.violations() {
                eprintln!("error: {violation}");
            }
            ExitCode::from(2)
        }
        PlanError::SearchExhausted { .. } => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
