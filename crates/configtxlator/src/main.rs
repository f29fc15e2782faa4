// Command-line front end for the translator and its REST server

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use configtx_io::{Input, Output};
use configtxlator::{
    rest, telemetry, ServerConfig, Translator, TranslatorConfig, DEFAULT_HOSTNAME, DEFAULT_PORT,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "configtxlator")]
#[command(about = "Utility for generating channel configuration transactions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter (e.g. "debug"). Defaults to RUST_LOG, then "info"
    #[arg(long, global = true)]
    log_level: Option<String>,
}

/// Version and epoch stamped on envelopes this command builds.
#[derive(Args)]
struct EnvelopeArgs {
    /// Channel header version
    #[arg(long = "header-version", default_value_t = 0)]
    header_version: i32,

    /// Channel header epoch
    #[arg(long, default_value_t = 0)]
    epoch: u64,
}

impl EnvelopeArgs {
    fn translator(&self) -> Translator {
        Translator::new(TranslatorConfig::default().with_envelope(self.header_version, self.epoch))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert between the JSON and protobuf forms of a message
    Encode {
        /// Fully qualified message name (e.g. common.Config)
        #[arg(short, long = "msg")]
        msg: String,

        /// Input file, stdin when absent
        #[arg(short, long = "in")]
        input: Option<PathBuf>,

        /// Input is base64 encoded
        #[arg(long = "i64")]
        input_base64: bool,

        /// Input is JSON
        #[arg(long = "ij")]
        input_json: bool,

        /// Output file, stdout when absent
        #[arg(short, long = "out")]
        output: Option<PathBuf>,

        /// Output JSON
        #[arg(long = "oj")]
        output_json: bool,
    },

    /// Compute the config update between two configs
    Update {
        /// Original config
        #[arg(short = '1', long = "original")]
        original: Option<PathBuf>,

        /// Original config is base64 encoded
        #[arg(long = "164")]
        original_base64: bool,

        /// Original config is JSON
        #[arg(long = "1j")]
        original_json: bool,

        /// Updated config
        #[arg(short = '2', long = "updated")]
        updated: Option<PathBuf>,

        /// Updated config is base64 encoded
        #[arg(long = "264")]
        updated_base64: bool,

        /// Updated config is JSON
        #[arg(long = "2j")]
        updated_json: bool,

        /// Channel the update is for
        #[arg(short, long)]
        channel: String,

        /// Wrap the update in an unsigned CONFIG_UPDATE envelope
        #[arg(short, long)]
        envelope: bool,

        /// Output file, stdout when absent
        #[arg(short, long = "out")]
        output: Option<PathBuf>,

        /// Output JSON
        #[arg(long = "oj")]
        output_json: bool,

        #[command(flatten)]
        envelope_args: EnvelopeArgs,
    },

    /// Sanity-check a config
    Verify {
        /// Input file, stdin when absent
        #[arg(short, long = "in")]
        input: Option<PathBuf>,

        /// Input is base64 encoded
        #[arg(long = "i64")]
        input_base64: bool,

        /// Input is JSON
        #[arg(long = "ij")]
        input_json: bool,

        /// Output file for the JSON diagnostics, stdout when absent
        #[arg(short, long = "out")]
        output: Option<PathBuf>,
    },

    /// Add a signature to a CONFIG_UPDATE envelope
    #[command(alias = "sc")]
    SignConfigUpdate {
        /// Input envelope, stdin when absent
        #[arg(short, long = "in")]
        input: Option<PathBuf>,

        /// Input is base64 encoded
        #[arg(long = "i64")]
        input_base64: bool,

        /// Input is JSON
        #[arg(long = "ij")]
        input_json: bool,

        /// Channel the update is for
        #[arg(short, long)]
        channel: String,

        /// MSP id of the signing organization
        #[arg(long = "mspid")]
        msp_id: String,

        /// MSP directory; without it the envelope is re-wrapped unsigned
        #[arg(long = "mspdir")]
        msp_dir: Option<PathBuf>,

        /// Output file, stdout when absent
        #[arg(short, long = "out")]
        output: Option<PathBuf>,

        /// Output JSON
        #[arg(long = "oj")]
        output_json: bool,

        #[command(flatten)]
        envelope_args: EnvelopeArgs,
    },

    /// Serve the REST API
    Start {
        /// Host to listen on
        #[arg(long, default_value = DEFAULT_HOSTNAME)]
        hostname: String,

        /// Port to listen on
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Allowed CORS origin, repeatable ("*" for any)
        #[arg(long = "cors")]
        cors: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Encode {
            msg,
            input,
            input_base64,
            input_json,
            output,
            output_json,
        } => {
            let input = Input::resolve(input, true, "input")
                .context("Error reading input")?
                .with_base64(input_base64)
                .with_json(input_json);
            let translator = Translator::default();
            translator
                .registry()
                .lookup(&msg)
                .context("Invalid message type")?;
            let message = translator
                .decode(&msg, &input)
                .context("Error reading input")?;

            Output::resolve(output, true)
                .with_json(output_json)
                .emit_dyn(message.as_ref())
                .context("Error writing output")?;
        }

        Commands::Update {
            original,
            original_base64,
            original_json,
            updated,
            updated_base64,
            updated_json,
            channel,
            envelope,
            output,
            output_json,
            envelope_args,
        } => {
            let original = Input::resolve(original, false, "original config")
                .context("Error reading original config")?
                .with_base64(original_base64)
                .with_json(original_json);
            let updated = Input::resolve(updated, false, "updated config")
                .context("Error reading updated config")?
                .with_base64(updated_base64)
                .with_json(updated_json);

            let update = envelope_args
                .translator()
                .compute_update(&original, &updated, &channel, envelope)
                .context("Error computing update")?;

            Output::resolve(output, true)
                .with_json(output_json)
                .emit_dyn(update.as_message())
                .context("Error writing output")?;
        }

        Commands::Verify {
            input,
            input_base64,
            input_json,
            output,
        } => {
            let input = Input::resolve(input, true, "input")
                .context("Error reading input")?
                .with_base64(input_base64)
                .with_json(input_json);
            let messages = Translator::default()
                .verify(&input)
                .context("Error reading input")?;

            let rendered = messages.to_json().context("Error encoding diagnostics")?;
            Output::resolve(output, true)
                .write_bytes(&rendered)
                .context("Error writing output")?;
        }

        Commands::SignConfigUpdate {
            input,
            input_base64,
            input_json,
            channel,
            msp_id,
            msp_dir,
            output,
            output_json,
            envelope_args,
        } => {
            let input = Input::resolve(input, true, "input")
                .context("Error reading input")?
                .with_base64(input_base64)
                .with_json(input_json);

            let signed = envelope_args
                .translator()
                .sign_envelope(&input, &channel, &msp_id, msp_dir.as_deref())
                .context("Error signing config update")?;
            info!(
                signatures = signed.outcome.signature_count,
                update = %signed.outcome.update_digest,
                "config update envelope ready"
            );

            Output::resolve(output, true)
                .with_json(output_json)
                .emit(&signed.envelope)
                .context("Error writing output")?;
        }

        Commands::Start {
            hostname,
            port,
            cors,
        } => {
            let config = ServerConfig {
                hostname,
                port,
                cors_origins: cors,
            };
            rest::serve(Translator::default(), &config).await?;
        }
    }

    Ok(())
}
