use std::sync::Arc;

use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::{ChangeCommand, RuntimeConfig};
use crate::checking::{StrategyRegistry, StrategyTrait, UnknownStrategyError};
use crate::ext::BestEffortPathExt;

pub struct Application;

impl Application {
    /// Runs one check and returns whether a change was detected.
    ///
    /// The new state is persisted, and the change command run, only when a
    /// change was detected.
    pub async fn run(
        app_config: impl Into<RuntimeConfig>,
        registry: &StrategyRegistry,
    ) -> Result<bool, ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let arc_app_config = Arc::new(app_config);

        let mut strategy = registry
            .create(&arc_app_config.method, arc_app_config.clone())
            .context(StrategySelectionSnafu)?;
        info!(
            "Checking {} target(s) with the '{}' method against {}",
            arc_app_config.targets.len(),
            strategy.name(),
            arc_app_config.database.best_effort_path_display()
        );

        strategy.read_previous_state().await;
        if !strategy.check() {
            info!("No changes detected");
            return Ok(false);
        }

        info!("Changes detected, updating database");
        strategy.write_state().await;

        if let Some(command) = &arc_app_config.on_change {
            if let Err(err) = ChangeCommand::new(command).run().await {
                warn!("{}", snafu::Report::from_error(err));
            }
        } else {
            debug!("No change command configured");
        }

        Ok(true)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while selecting the checking method"))]
    StrategySelectionError { source: UnknownStrategyError },
}
