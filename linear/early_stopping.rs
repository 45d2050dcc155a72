/// The parameters in this struct control how to determine whether training should stop early after each epoch.
#[derive(Clone, Debug)]
pub struct EarlyStoppingOptions {
	/// If this many epochs pass by without a significant improvement in the loss over the previous epoch, training will be stopped early.
	pub n_epochs_without_improvement_to_stop: usize,
	/// This is the minimum decrease in the loss for an epoch to be considered a significant improvement over the previous epoch.
	pub min_decrease_in_loss_for_significant_change: f32,
}

/**
The `EarlyStoppingMonitor` keeps track of the loss after each epoch, and if enough epochs have passed without a significant improvement, the `update()` function will return `true` to indicate that training should be stopped.
*/
pub struct EarlyStoppingMonitor {
	threshold: f32,
	epochs: usize,
	n_epochs_without_observed_improvement: usize,
	previous_epoch_loss: Option<f32>,
}

impl EarlyStoppingMonitor {
	pub fn new(options: &EarlyStoppingOptions) -> Self {
		EarlyStoppingMonitor {
			threshold: options.min_decrease_in_loss_for_significant_change,
			epochs: options.n_epochs_without_improvement_to_stop,
			previous_epoch_loss: None,
			n_epochs_without_observed_improvement: 0,
		}
	}

	/// This function updates the `EarlyStoppingMonitor` with the next epoch's loss. It returns true if training should stop.
	pub fn update(&mut self, loss: f32) -> bool {
		let result = if let Some(previous_loss) = self.previous_epoch_loss {
			if loss > previous_loss || f32::abs(loss - previous_loss) < self.threshold {
				self.n_epochs_without_observed_improvement += 1;
				self.n_epochs_without_observed_improvement >= self.epochs
			} else {
				self.n_epochs_without_observed_improvement = 0;
				false
			}
		} else {
			false
		};
		self.previous_epoch_loss = Some(loss);
		result
	}
}

#[test]
fn test_early_stopping_monitor() {
	let mut monitor = EarlyStoppingMonitor::new(&EarlyStoppingOptions {
		n_epochs_without_improvement_to_stop: 2,
		min_decrease_in_loss_for_significant_change: 0.01,
	});
	assert!(!monitor.update(1.0));
	assert!(!monitor.update(0.5));
	assert!(!monitor.update(0.499));
	assert!(monitor.update(0.6));
}
