//! Joint training of the sparse autoencoder and the classifier
//!
//! Each training batch runs one shared forward pass:
//!
//! - the autoencoder reconstructs the input through the thresholded gate;
//! - the input is weighted by the live attention values and encoded again,
//!   and that code is classified.
//!
//! Two losses are derived from this pass. The classification loss backpropagates
//! into the classifier and into the encoder. The reconstruction + sparsity loss
//! then adds its own gradient to the encoder and decoder. Each parameter group
//! is stepped by its own SGD instance, so the autoencoder update carries the
//! gradient of both losses while the classifier only sees its own.

use crate::config::ExperimentConfig;
use crate::data::{Batch, BatchLoader};
use crate::error::{Error, Result};
use crate::loss::{self, ReconstructionLoss};
use crate::model::{active_sensors, AutoEncoder, AutoEncoderPass, Classifier, EncoderPass};
use crate::optimizers::SGD;
use crate::utils::linalg::{argmax_rows, hadamard};
use crate::utils::SimpleRng;
use std::time::Instant;

/// Attention-weighted encoding and class probabilities for a batch.
#[derive(Debug, Clone)]
pub struct ClassifierPass {
    /// `sigmoid(gate(x))` of the raw input
    pub attention: Vec<f32>,
    /// `x ⊙ attention`
    pub attended: Vec<f32>,
    /// Encoder pass over `attended`
    pub code: EncoderPass,
    pub probs: Vec<f32>,
}

/// Everything computed by one training forward pass.
#[derive(Debug, Clone)]
pub struct JointPass {
    pub autoencoder: AutoEncoderPass,
    pub classifier: ClassifierPass,
}

/// Scalars produced by one training batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchOutcome {
    pub reconstruction: ReconstructionLoss,
    /// Mean NLL over the batch
    pub classification_loss: f32,
    /// Summed squared reconstruction error
    pub reconstruction_sse: f32,
    pub correct: usize,
    /// Mean gate entries above threshold per sample
    pub active_sensors: f32,
}

/// Aggregates for one pass over a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochStats {
    /// Summed squared error / (number of batches × input size)
    pub reconstruction_loss: f32,
    /// Summed NLL / number of samples
    pub classification_loss: f32,
    /// Percent of samples classified correctly
    pub accuracy: f32,
    /// Mean over batches of the active sensors per sample
    pub active_sensors: f32,
    /// Mean wall-clock seconds of the classification sub-step per batch
    /// (evaluation only)
    pub mean_classify_secs: Option<f64>,
}

impl EpochStats {
    /// `active_sensors` as a fraction of the input width.
    pub fn sensor_fraction(&self, input_size: usize) -> f32 {
        self.active_sensors / input_size as f32
    }
}

/// Result of an evaluation pass.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub stats: EpochStats,
    /// Class probabilities for every sample, in dataset order
    pub probabilities: Vec<f32>,
}

/// Per-epoch statistics of a whole run.
#[derive(Debug, Clone, Default)]
pub struct History {
    pub train: Vec<EpochStats>,
    pub test: Vec<EpochStats>,
}

/// Metrics of the epoch with the highest test accuracy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestEpoch {
    /// 0-based epoch index
    pub epoch: usize,
    pub train_accuracy: f32,
    pub test_accuracy: f32,
    pub max_train_accuracy: f32,
    pub train_sensors: f32,
    pub test_sensors: f32,
    pub train_loss: f32,
    pub test_loss: f32,
}

impl History {
    pub fn push(&mut self, train: EpochStats, test: EpochStats) {
        self.train.push(train);
        self.test.push(test);
    }

    pub fn len(&self) -> usize {
        self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.test.is_empty()
    }

    /// Epoch with the maximum test accuracy; the earliest one wins ties.
    pub fn best_epoch(&self) -> Option<BestEpoch> {
        let mut best: Option<usize> = None;
        for (i, stats) in self.test.iter().enumerate() {
            match best {
                Some(b) if self.test[b].accuracy >= stats.accuracy => {}
                _ => best = Some(i),
            }
        }
        let epoch = best?;
        let train = self.train.get(epoch)?;
        let test = &self.test[epoch];
        let max_train_accuracy = self
            .train
            .iter()
            .map(|s| s.accuracy)
            .fold(f32::NEG_INFINITY, f32::max);

        Some(BestEpoch {
            epoch,
            train_accuracy: train.accuracy,
            test_accuracy: test.accuracy,
            max_train_accuracy,
            train_sensors: train.active_sensors,
            test_sensors: test.active_sensors,
            train_loss: train.reconstruction_loss,
            test_loss: test.reconstruction_loss,
        })
    }
}

/// Autoencoder, classifier and their optimizers for one run.
#[derive(Debug, Clone)]
pub struct Experiment {
    config: ExperimentConfig,
    autoencoder: AutoEncoder,
    classifier: Classifier,
    autoencoder_optimizer: SGD,
    classifier_optimizer: SGD,
    sparsity_target: Vec<f32>,
}

impl Experiment {
    /// Initialise both parameter groups from `rng`.
    pub fn new(config: ExperimentConfig, rng: &mut SimpleRng) -> Self {
        let autoencoder = AutoEncoder::new(config.input_size, config.hidden_size, rng);
        let classifier = Classifier::new(config.hidden_size, config.num_classes, rng);
        Self::from_parts(config, autoencoder, classifier)
    }

    pub fn from_parts(
        config: ExperimentConfig,
        autoencoder: AutoEncoder,
        classifier: Classifier,
    ) -> Self {
        Self {
            autoencoder_optimizer: SGD::new(config.learning_rate),
            classifier_optimizer: SGD::new(config.learning_rate),
            sparsity_target: vec![config.sparsity_target; config.hidden_size],
            config,
            autoencoder,
            classifier,
        }
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn autoencoder(&self) -> &AutoEncoder {
        &self.autoencoder
    }

    pub fn autoencoder_mut(&mut self) -> &mut AutoEncoder {
        &mut self.autoencoder
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut Classifier {
        &mut self.classifier
    }

    pub fn autoencoder_optimizer(&self) -> &SGD {
        &self.autoencoder_optimizer
    }

    pub fn classifier_optimizer(&self) -> &SGD {
        &self.classifier_optimizer
    }

    /// Attention-weight the input, encode it again and classify the code.
    pub fn classify(&self, inputs: &[f32], rows: usize) -> ClassifierPass {
        let encoder = self.autoencoder.encoder();
        let attention = encoder.attention(inputs, rows);
        let mut attended = vec![0.0f32; attention.len()];
        hadamard(&inputs[..attention.len()], &attention, &mut attended);
        let code = encoder.forward(&attended, rows, self.config.threshold);
        let probs = self.classifier.forward(&code.hidden, rows);
        ClassifierPass {
            attention,
            attended,
            code,
            probs,
        }
    }

    pub fn forward(&self, inputs: &[f32], rows: usize) -> JointPass {
        JointPass {
            autoencoder: self.autoencoder.forward(inputs, rows, self.config.threshold),
            classifier: self.classify(inputs, rows),
        }
    }

    /// Mean activation ρ̂ of the classification-path code.
    fn observed_sparsity(&self, pass: &JointPass, rows: usize) -> Vec<f32> {
        loss::mean_activation(&pass.classifier.code.hidden, rows, self.config.hidden_size)
    }

    fn reconstruction_loss(&self, pass: &JointPass, inputs: &[f32], rho_hat: &[f32]) -> ReconstructionLoss {
        ReconstructionLoss::new(
            loss::mse(&pass.autoencoder.reconstruction, inputs),
            loss::sparsity_divergence(&self.sparsity_target, rho_hat),
            loss::attention_penalty(
                &pass.classifier.attention,
                self.config.batch_size,
                self.config.input_size,
            ),
            self.config.sparsity_weight,
            self.config.attention_weight,
        )
    }

    /// Classification loss plus reconstruction loss for a batch, without
    /// touching any gradient.
    pub fn objective(&self, batch: &Batch) -> f32 {
        let rows = batch.len();
        let pass = self.forward(&batch.inputs, rows);
        let classification =
            loss::nll(&pass.classifier.probs, &batch.labels, self.config.num_classes);
        let rho_hat = self.observed_sparsity(&pass, rows);
        classification + self.reconstruction_loss(&pass, &batch.inputs, &rho_hat).total
    }

    /// Zero both gradient groups, run the forward pass and accumulate the
    /// gradients of both losses. Parameters are not changed.
    pub fn compute_gradients(&mut self, batch: &Batch) -> BatchOutcome {
        let rows = batch.len();
        let inputs = &batch.inputs;
        let input_size = self.config.input_size;
        let hidden_size = self.config.hidden_size;
        let num_classes = self.config.num_classes;

        self.autoencoder.zero_grad();
        self.classifier.zero_grad();

        let pass = self.forward(inputs, rows);
        let cls = &pass.classifier;

        // Classification loss: classifier and, through the code, the encoder.
        let classification_loss = loss::nll(&cls.probs, &batch.labels, num_classes);
        let mut grad_probs = vec![0.0f32; cls.probs.len()];
        loss::nll_grad(&batch.labels, num_classes, &mut grad_probs);
        let mut grad_code = self
            .classifier
            .backward(&cls.code.hidden, &cls.probs, &grad_probs, rows);

        // Sparsity divergence on the mean code activation.
        let rho_hat = self.observed_sparsity(&pass, rows);
        let reconstruction = self.reconstruction_loss(&pass, inputs, &rho_hat);
        if !reconstruction.total.is_finite() {
            log::warn!("non-finite reconstruction loss: {:?}", reconstruction);
        }
        let grad_rho = loss::sparsity_divergence_grad(&self.sparsity_target, &rho_hat);
        let scale = self.config.sparsity_weight / rows as f32;
        for row in grad_code.chunks_exact_mut(hidden_size) {
            for (g, &d) in row.iter_mut().zip(&grad_rho) {
                *g += scale * d;
            }
        }

        // Code → attended input → attention → gate.
        let encoder = self.autoencoder.encoder();
        let grad_attended = encoder.backward_projection(&cls.code, &grad_code);
        let penalty = self.config.attention_weight
            * loss::attention_penalty_grad(self.config.batch_size, input_size);
        let grad_attention: Vec<f32> = grad_attended
            .iter()
            .zip(inputs)
            .map(|(&g, &x)| g * x + penalty)
            .collect();
        encoder.backward_attention(inputs, &cls.attention, &grad_attention, rows);

        // Reconstruction error: decoder and projection.
        let recon = &pass.autoencoder.reconstruction;
        let mut grad_recon = vec![0.0f32; recon.len()];
        loss::mse_grad(recon, inputs, &mut grad_recon);
        self.autoencoder.backward(&pass.autoencoder, &grad_recon);

        let predictions = argmax_rows(&cls.probs, rows, num_classes);
        let correct = predictions
            .iter()
            .zip(&batch.labels)
            .filter(|(p, l)| p == l)
            .count();

        BatchOutcome {
            reconstruction,
            classification_loss,
            reconstruction_sse: loss::sse(recon, inputs),
            correct,
            active_sensors: active_sensors(&cls.attention, rows, self.config.threshold),
        }
    }

    /// One optimisation step on a batch.
    ///
    /// The classifier is stepped first. The reconstruction loss does not depend
    /// on classifier weights, so this matches stepping it before the
    /// reconstruction gradient is accumulated.
    pub fn train_batch(&mut self, batch: &Batch) -> BatchOutcome {
        let outcome = self.compute_gradients(batch);
        self.classifier.step(&mut self.classifier_optimizer);
        self.autoencoder.step(&mut self.autoencoder_optimizer);
        outcome
    }

    fn check_loader(&self, loader: &BatchLoader) -> Result<()> {
        let dataset = loader.dataset();
        if dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }
        if dataset.feature_count() != self.config.input_size {
            return Err(Error::ShapeMismatch {
                expected: self.config.input_size,
                actual: dataset.feature_count(),
            });
        }
        Ok(())
    }

    /// Train for one epoch (1-based `epoch`, used in progress lines).
    pub fn train_epoch(
        &mut self,
        epoch: usize,
        loader: &BatchLoader,
        rng: &mut SimpleRng,
    ) -> Result<EpochStats> {
        self.check_loader(loader)?;
        let total = loader.dataset().len();
        let num_batches = loader.num_batches();

        let mut sse = 0.0f32;
        let mut nll_sum = 0.0f32;
        let mut correct = 0usize;
        let mut sensors = Vec::with_capacity(num_batches);

        for (batch_idx, batch) in loader.epoch(rng).enumerate() {
            let outcome = self.train_batch(&batch);
            sse += outcome.reconstruction_sse;
            nll_sum += outcome.classification_loss * batch.len() as f32;
            correct += outcome.correct;
            sensors.push(outcome.active_sensors);

            if batch_idx % self.config.log_interval == 0 {
                log::info!(
                    "Train Epoch: {} [{}/{} ({:.0}%)]\tLoss: {:.6}",
                    epoch,
                    batch_idx * batch.len(),
                    total,
                    100.0 * batch_idx as f32 / num_batches as f32,
                    outcome.reconstruction.total
                );
            }
        }

        let stats = EpochStats {
            reconstruction_loss: sse / (num_batches * self.config.input_size) as f32,
            classification_loss: nll_sum / total as f32,
            accuracy: 100.0 * correct as f32 / total as f32,
            active_sensors: mean(&sensors),
            mean_classify_secs: None,
        };
        println!("\nTrain accuracy: {}", stats.accuracy);
        println!("\nTrain set: Average loss: {}", stats.reconstruction_loss);
        Ok(stats)
    }

    /// Evaluate without updating any parameter, batches in dataset order.
    pub fn evaluate(&self, loader: &BatchLoader) -> Result<Evaluation> {
        self.check_loader(loader)?;
        let total = loader.dataset().len();
        let num_batches = loader.num_batches();
        let num_classes = self.config.num_classes;

        let mut sse = 0.0f32;
        let mut nll_sum = 0.0f32;
        let mut correct = 0usize;
        let mut sensors = Vec::with_capacity(num_batches);
        let mut timings = Vec::with_capacity(num_batches);
        let mut probabilities = Vec::with_capacity(total * num_classes);

        for batch in loader.iter() {
            let rows = batch.len();
            let recon = self
                .autoencoder
                .forward(&batch.inputs, rows, self.config.threshold);

            let start = Instant::now();
            let cls = self.classify(&batch.inputs, rows);
            timings.push(start.elapsed().as_secs_f64());

            nll_sum += loss::nll_sum(&cls.probs, &batch.labels, num_classes);
            correct += argmax_rows(&cls.probs, rows, num_classes)
                .iter()
                .zip(&batch.labels)
                .filter(|(p, l)| p == l)
                .count();
            sensors.push(active_sensors(&cls.attention, rows, self.config.threshold));
            sse += loss::sse(&recon.reconstruction, &batch.inputs);
            probabilities.extend_from_slice(&cls.probs);
        }

        let mean_time = timings.iter().sum::<f64>() / timings.len() as f64;
        let stats = EpochStats {
            reconstruction_loss: sse / (num_batches * self.config.input_size) as f32,
            classification_loss: nll_sum / total as f32,
            accuracy: 100.0 * correct as f32 / total as f32,
            active_sensors: mean(&sensors),
            mean_classify_secs: Some(mean_time),
        };
        println!("\nTest set: Average loss: {}", stats.reconstruction_loss);
        println!("\nTest accuracy: {}", stats.accuracy);
        println!("time: {}", mean_time);

        Ok(Evaluation {
            stats,
            probabilities,
        })
    }

    /// Train and evaluate for `config.epochs` epochs.
    ///
    /// Both loaders are checked before the first update, so an empty test
    /// split fails without training anything.
    pub fn fit(
        &mut self,
        train: &BatchLoader,
        test: &BatchLoader,
        rng: &mut SimpleRng,
    ) -> Result<History> {
        self.check_loader(train)?;
        self.check_loader(test)?;
        let mut history = History::default();
        for epoch in 1..=self.config.epochs {
            let train_stats = self.train_epoch(epoch, train, rng)?;
            let test_stats = self.evaluate(test)?.stats;
            log::debug!(
                "epoch {epoch}: train acc {:.2}, test acc {:.2}, sensors {:.2}/{:.2}",
                train_stats.accuracy,
                test_stats.accuracy,
                train_stats.active_sensors,
                test_stats.active_sensors
            );
            history.push(train_stats, test_stats);
        }
        Ok(history)
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}
