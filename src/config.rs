use crate::model::FteConfigId;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Poids du classement des candidats.
///
/// Score principal = `shortfall × manque (milli-gardes) − load × gardes × 1000`,
/// trié décroissant. Les valeurs par défaut donnent l'ordre « plus gros manque
/// d'abord, puis moins d'affectations, puis identifiant ».
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub shortfall: i64,
    pub load: i64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            shortfall: 1,
            load: 0,
        }
    }
}

/// Réglages du moteur, passés explicitement à chaque exécution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ranking: RankingWeights,
    /// Graine du départage final ; `None` départage par identifiant.
    pub tie_break_seed: Option<u64>,
    /// Réparation locale des unités restées sous effectif après le glouton.
    pub repair: bool,
    /// Plafond de tentatives de réparation (chacune annulable).
    pub max_repair_attempts: u32,
    pub double_station: bool,
    pub fairness: bool,
    pub max_fairness_passes: u32,
    /// Configuration FTE à utiliser ; sinon la première active.
    pub fte_configuration: Option<FteConfigId>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ranking: RankingWeights::default(),
            tie_break_seed: None,
            repair: true,
            max_repair_attempts: 2000,
            double_station: true,
            fairness: true,
            max_fairness_passes: 32,
            fte_configuration: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ranking.shortfall < 0 || self.ranking.load < 0 {
            bail!("ranking weights must be non-negative");
        }
        if self.ranking.shortfall == 0 && self.ranking.load == 0 {
            bail!("at least one ranking weight must be positive");
        }
        Ok(())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data =
            fs::read(path).with_context(|| format!("reading engine config {}", path.display()))?;
        let config: EngineConfig = serde_json::from_slice(&data)
            .with_context(|| format!("parsing engine config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}
