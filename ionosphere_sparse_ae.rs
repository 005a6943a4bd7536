use sparse_attention_ae::config::{config_from_args, ExperimentConfig};
use sparse_attention_ae::data::{load_dataset, split_dataset, BatchLoader, Dataset};
use sparse_attention_ae::training::{BestEpoch, Experiment};
use sparse_attention_ae::utils::SimpleRng;
use std::error::Error;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// Sparse-attention autoencoder + classifier on the ionosphere radar data.
// Usage: ionosphere_sparse_ae [config.json]

fn print_class_counts(title: &str, dataset: &Dataset, num_classes: usize) {
    println!("=============={title}================");
    for (class, count) in dataset.class_counts(num_classes).iter().enumerate() {
        println!("number of class {}: {}", class + 1, count);
    }
}

fn print_summary(best: &BestEpoch, train_fraction: f32, test_fraction: f32) {
    println!("\n=== Best Epoch Summary ===");
    println!("Train Accuracy (max): {}", best.max_train_accuracy);
    println!("Test Accuracy (max): {}", best.test_accuracy);
    println!("index is: {}", best.epoch);
    println!("Train Accuracy at best epoch: {}", best.train_accuracy);
    println!("Number of train sensors: {}", best.train_sensors);
    println!("Number of test sensors: {}", best.test_sensors);
    println!(
        "Fraction of sensors used (train/test): {:.4}/{:.4}",
        train_fraction, test_fraction
    );
    println!("Train recon loss: {}", best.train_loss);
    println!("Test recon loss: {}", best.test_loss);
    println!("==========================");
}

fn run(config: ExperimentConfig) -> Result<(), Box<dyn Error>> {
    let program_start = Instant::now();
    let mut rng = SimpleRng::from_seed_or_time(config.seed);

    log::info!("Loading dataset from {}", config.data_path);
    let dataset = load_dataset(&config.data_path, config.input_size)?;
    let (train, test) = split_dataset(&dataset, config.train_size, &mut rng)?;

    print_class_counts("Training", &train, config.num_classes);
    print_class_counts("Testing", &test, config.num_classes);

    let train_loader = BatchLoader::new(train, config.batch_size, true);
    let test_loader = BatchLoader::new(test, config.batch_size, false);

    log::info!("Initializing autoencoder and classifier...");
    let mut experiment = Experiment::new(config.clone(), &mut rng);
    println!("{}", experiment.autoencoder());
    println!("{}", experiment.classifier());

    log::info!("Training for {} epochs...", config.epochs);
    let history = experiment.fit(&train_loader, &test_loader, &mut rng)?;

    if let Some(best) = history.best_epoch() {
        print_summary(
            &best,
            history.train[best.epoch].sensor_fraction(config.input_size),
            history.test[best.epoch].sensor_fraction(config.input_size),
        );
    }
    println!(
        "Total program time: {:.2} seconds",
        program_start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    // Also installs the bridge for the library's `log` records.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = config_from_args(&args)?;
    run(config)
}
