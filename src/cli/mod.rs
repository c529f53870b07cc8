// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap, hands off to Layer 2 and prints
// what comes back.
//
//   1. `train`    — fit the head, report test accuracy
//   2. `evaluate` — test-set report for a saved checkpoint
//   3. `predict`  — label reviews given with --text
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, PredictArgs, TrainArgs};

use crate::domain::{review::Prediction, sentiment::Sentiment};
use crate::ml::evaluator::EvalReport;

#[derive(Parser, Debug)]
#[command(
    name = "review-sentiment",
    version = "0.1.0",
    about = "Train a sentiment classifier head on a frozen BERT encoder, then label movie reviews."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Predict(args)  => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training with encoder '{}'", args.pretrained);
    let checkpoint_dir = args.checkpoint_dir.clone();
    let summary = TrainUseCase::new(args.into()).execute()?;

    if let Some(best) = summary
        .history
        .iter()
        .filter(|m| m.val_loss.is_finite())
        .min_by(|a, b| a.val_loss.total_cmp(&b.val_loss))
    {
        println!(
            "\nBest epoch: {} (val_loss={:.4}, val_acc={:.1}%)",
            best.epoch,
            best.val_loss,
            best.val_acc * 100.0
        );
    }

    print_report("Test", &summary.test_report);

    println!("\nExample reviews:");
    for (text, prediction) in &summary.examples {
        println!("  \"{}\"", text);
        println!("    → {}", format_prediction(prediction));
    }

    println!("\nTraining complete. Checkpoints saved in '{}'.", checkpoint_dir);
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let report = EvaluateUseCase::new(args.checkpoint_dir, args.max_test_samples).execute()?;
    print_report("Test", &report);
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case    = PredictUseCase::new(&args.checkpoint_dir)?;
    let predictions = use_case.predict(&args.texts)?;
    for (text, prediction) in args.texts.iter().zip(&predictions) {
        println!("{}\t{}", format_prediction(prediction), text);
    }
    Ok(())
}

fn format_prediction(p: &Prediction) -> String {
    format!("{} ({:.3})", p.label, p.confidence)
}

fn print_report(name: &str, report: &EvalReport) {
    println!(
        "\n{} set: {} reviews | loss={:.4} | accuracy={:.2}%",
        name,
        report.total(),
        report.loss,
        report.accuracy() * 100.0
    );
    for class in Sentiment::ALL {
        println!(
            "  {:<8} precision={:.3} recall={:.3}",
            class.to_string(),
            report.precision(class),
            report.recall(class)
        );
    }
}
