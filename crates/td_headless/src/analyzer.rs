//! Static balance analysis of a configuration.
//!
//! Scores tower types by damage output per unit of cost, measures how wave
//! difficulty ramps, and checks that the economy can pay for a defense.
//! No simulation is run; everything is derived from the numbers in the
//! config.

use serde::{Deserialize, Serialize};

use td_core::data::{GameConfig, TowerTypeConfig, WaveConfig};
use td_core::error::Result;
use td_core::path::Path;

/// Reference health pools for time-to-kill figures.
pub const REFERENCE_HEALTH: [i32; 3] = [100, 150, 200];

/// Efficiency ratio between best and worst tower type that counts as a gap.
pub const EFFICIENCY_GAP: f32 = 2.0;

/// First-to-last wave difficulty ratio below which the ramp is too flat.
pub const FLAT_PROGRESSION: f32 = 1.5;

/// First-to-last wave difficulty ratio above which the ramp is too steep.
pub const STEEP_PROGRESSION: f32 = 5.0;

/// Fewest affordable towers of the first type before the economy is flagged.
pub const MIN_AFFORDABLE_TOWERS: i64 = 3;

/// How loudly a recommendation should be raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational figure
    Info,
    /// Likely balance problem
    Warning,
}

/// A balance finding with a suggested direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Issue severity
    pub severity: Severity,
    /// What was observed
    pub finding: String,
    /// What to consider changing, if anything
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Recommendation {
    fn info(finding: String) -> Self {
        Self {
            severity: Severity::Info,
            finding,
            suggestion: None,
        }
    }

    fn warning(finding: String, suggestion: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            finding,
            suggestion: Some(suggestion.into()),
        }
    }
}

/// Kill speed against one reference health pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillTime {
    /// Target health
    pub health: i32,
    /// Shots needed, or `None` for a tower that deals no damage
    pub shots: Option<u32>,
    /// Seconds of cooldown spent on those shots
    pub seconds: Option<f32>,
}

/// Figures for one tower type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerAnalysis {
    /// Tower type id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Purchase price.
    pub cost: i32,
    /// Damage per shot.
    pub damage: i32,
    /// Seconds between shots.
    pub attack_cooldown: f32,
    /// Targeting radius.
    pub range: f32,
    /// Damage per second; infinite for a zero cooldown
    pub dps: f32,
    /// DPS per unit of cost; zero for a free tower
    pub dps_per_cost: f32,
    /// Kill speed against each of [`REFERENCE_HEALTH`]
    pub kill_times: Vec<KillTime>,
    /// `dps_per_cost * range / 100`, higher is better
    pub efficiency: f32,
}

impl TowerAnalysis {
    /// Score a tower type.
    pub fn new(tower: &TowerTypeConfig) -> Self {
        let dps = tower.dps();
        let dps_per_cost = if tower.cost > 0 {
            dps / tower.cost as f32
        } else {
            0.0
        };

        let kill_times = REFERENCE_HEALTH
            .iter()
            .map(|&health| {
                let shots = (tower.damage > 0).then(|| shots_to_kill(health, tower.damage));
                KillTime {
                    health,
                    shots,
                    seconds: shots.map(|n| n as f32 * tower.attack_cooldown),
                }
            })
            .collect();

        Self {
            id: tower.id,
            name: tower.name.clone(),
            cost: tower.cost,
            damage: tower.damage,
            attack_cooldown: tower.attack_cooldown,
            range: tower.range,
            dps,
            dps_per_cost,
            kill_times,
            efficiency: dps_per_cost * (tower.range / 100.0),
        }
    }
}

/// Shots of `damage` needed to bring `health` to zero. Widened so extreme
/// configured values cannot overflow.
fn shots_to_kill(health: i32, damage: i32) -> u32 {
    let (health, damage) = (i64::from(health), i64::from(damage));
    u32::try_from((health + damage - 1) / damage).unwrap_or(0)
}

/// Figures for one wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveAnalysis {
    /// Configured wave number.
    pub wave_number: u32,
    /// Enemies in the wave.
    pub enemy_count: usize,
    /// Sum of enemy health.
    pub total_health: i64,
    /// Mean enemy health.
    pub average_health: f32,
    /// Mean enemy speed in units per second.
    pub average_speed: f32,
    /// Rewards with the default applied to unset entries
    pub total_reward: i64,
    /// Seconds for an average-speed enemy to walk the whole path
    pub path_time: f32,
    /// `total_health / average_speed`
    pub difficulty: f32,
}

impl WaveAnalysis {
    /// Score a wave against a path of `path_length`.
    pub fn new(wave: &WaveConfig, path_length: f32) -> Self {
        let enemy_count = wave.enemies.len();
        let total_health = wave.total_health();
        let total_speed: f32 = wave.enemies.iter().map(|e| e.speed).sum();

        let (average_health, average_speed) = if enemy_count > 0 {
            (
                total_health as f32 / enemy_count as f32,
                total_speed / enemy_count as f32,
            )
        } else {
            (0.0, 0.0)
        };

        let path_time = if average_speed > 0.0 && path_length > 0.0 {
            path_length / average_speed
        } else {
            0.0
        };
        let difficulty = if average_speed > 0.0 {
            total_health as f32 / average_speed
        } else {
            0.0
        };

        Self {
            wave_number: wave.wave_number,
            enemy_count,
            total_health,
            average_health,
            average_speed,
            total_reward: wave.total_reward(),
            path_time,
            difficulty,
        }
    }
}

/// Full balance report for a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    /// Starting money.
    pub initial_budget: i32,
    /// Starting lives.
    pub initial_lives: i32,
    /// Straight-line length through the waypoints
    pub path_length: f32,
    /// One entry per tower type, in configured order.
    pub towers: Vec<TowerAnalysis>,
    /// One entry per wave, in configured order.
    pub waves: Vec<WaveAnalysis>,
    /// Findings in the order the checks run.
    pub recommendations: Vec<Recommendation>,
}

impl BalanceReport {
    /// Whether any recommendation is a warning.
    pub fn has_warnings(&self) -> bool {
        self.recommendations
            .iter()
            .any(|r| r.severity == Severity::Warning)
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Generate markdown summary
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("# Balance Analysis Report\n\n");

        md.push_str("## Game Setup\n\n");
        md.push_str(&format!("- Initial budget: {}\n", self.initial_budget));
        md.push_str(&format!("- Initial lives: {}\n", self.initial_lives));
        md.push_str(&format!("- Path length: {:.2} units\n", self.path_length));

        md.push_str("\n## Towers\n\n");
        md.push_str("| Tower | Cost | Damage | Cooldown | Range | DPS | DPS/Cost | Efficiency | TTK 100/150/200 HP |\n");
        md.push_str("|-------|------|--------|----------|-------|-----|----------|------------|--------------------|\n");
        for tower in &self.towers {
            let ttk: Vec<String> = tower
                .kill_times
                .iter()
                .map(|k| k.seconds.map_or_else(|| "-".to_string(), |s| format!("{s:.2}s")))
                .collect();
            md.push_str(&format!(
                "| {} (#{}) | {} | {} | {:.2}s | {:.0} | {:.2} | {:.3} | {:.3} | {} |\n",
                tower.name,
                tower.id,
                tower.cost,
                tower.damage,
                tower.attack_cooldown,
                tower.range,
                tower.dps,
                tower.dps_per_cost,
                tower.efficiency,
                ttk.join(" / ")
            ));
        }

        md.push_str("\n## Waves\n\n");
        md.push_str("| Wave | Enemies | Total HP | Avg HP | Avg Speed | Reward | Path Time | Difficulty |\n");
        md.push_str("|------|---------|----------|--------|-----------|--------|-----------|------------|\n");
        for wave in &self.waves {
            md.push_str(&format!(
                "| {} | {} | {} | {:.1} | {:.1} | {} | {:.2}s | {:.2} |\n",
                wave.wave_number,
                wave.enemy_count,
                wave.total_health,
                wave.average_health,
                wave.average_speed,
                wave.total_reward,
                wave.path_time,
                wave.difficulty
            ));
        }

        md.push_str("\n## Recommendations\n\n");
        if self.recommendations.is_empty() {
            md.push_str("No issues found.\n");
        }
        for rec in &self.recommendations {
            let tag = match rec.severity {
                Severity::Info => "Info",
                Severity::Warning => "Warning",
            };
            md.push_str(&format!("- **[{tag}]** {}\n", rec.finding));
            if let Some(suggestion) = &rec.suggestion {
                md.push_str(&format!("  - Consider: {suggestion}\n"));
            }
        }
        md
    }
}

/// Analyze `config`.
///
/// Wave path times use a polyline through the waypoints regardless of the
/// configured path kind.
pub fn analyze(config: &GameConfig) -> Result<BalanceReport> {
    let path = Path::polyline(config.waypoints())?;
    let path_length = path.length();

    let towers: Vec<TowerAnalysis> = config.tower_types.iter().map(TowerAnalysis::new).collect();
    let waves: Vec<WaveAnalysis> = config
        .waves
        .iter()
        .map(|wave| WaveAnalysis::new(wave, path_length))
        .collect();

    let mut report = BalanceReport {
        initial_budget: config.initial_budget,
        initial_lives: config.initial_lives,
        path_length,
        towers,
        waves,
        recommendations: Vec::new(),
    };
    report.recommendations = recommend(&report);

    tracing::debug!(
        towers = report.towers.len(),
        waves = report.waves.len(),
        recommendations = report.recommendations.len(),
        "Balance analysis complete"
    );
    Ok(report)
}

fn recommend(report: &BalanceReport) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if report.towers.len() < 2 {
        out.push(Recommendation::info(
            "Need at least 2 tower types for an efficiency comparison".to_string(),
        ));
    } else {
        check_efficiency_gap(&report.towers, &mut out);
    }

    if report.waves.len() >= 2 {
        check_progression(&report.waves, &mut out);
    }

    match report.towers.first() {
        Some(first) if !report.waves.is_empty() => check_economy(report, first, &mut out),
        _ => {}
    }

    out
}

fn check_efficiency_gap(towers: &[TowerAnalysis], out: &mut Vec<Recommendation>) {
    let mut best = &towers[0];
    let mut worst = &towers[0];
    for tower in towers {
        if tower.efficiency > best.efficiency {
            best = tower;
        }
        if tower.efficiency < worst.efficiency {
            worst = tower;
        }
    }

    let ratio = best.efficiency / worst.efficiency;
    if ratio > EFFICIENCY_GAP {
        out.push(Recommendation::warning(
            format!(
                "Large efficiency gap: {} is {ratio:.1}x more efficient than {}",
                best.name, worst.name
            ),
            format!("reducing {0} cost or increasing {0} efficiency", worst.name),
        ));
    }
}

fn check_progression(waves: &[WaveAnalysis], out: &mut Vec<Recommendation>) {
    let first = &waves[0];
    let last = &waves[waves.len() - 1];
    let ratio = last.difficulty / first.difficulty;
    let finding = format!(
        "Wave difficulty increases by {ratio:.2}x from wave 1 to wave {}",
        waves.len()
    );

    out.push(if ratio < FLAT_PROGRESSION {
        Recommendation::warning(finding, "increasing difficulty more gradually across waves")
    } else if ratio > STEEP_PROGRESSION {
        Recommendation::warning(finding, "smoothing the difficulty spike, it may be too steep")
    } else {
        Recommendation::info(finding)
    });
}

fn check_economy(report: &BalanceReport, first: &TowerAnalysis, out: &mut Vec<Recommendation>) {
    let rewards: i64 = report.waves.iter().map(|w| w.total_reward).sum();
    let total = i64::from(report.initial_budget) + rewards;
    let finding = format!("Starting budget + wave rewards = {total} total");

    if first.cost <= 0 {
        out.push(Recommendation::info(finding));
        return;
    }

    let affordable = total / i64::from(first.cost);
    let finding = format!("{finding}, enough for about {affordable} {}", first.name);
    out.push(if affordable < MIN_AFFORDABLE_TOWERS {
        Recommendation::warning(finding, "increasing rewards or reducing tower costs")
    } else {
        Recommendation::info(finding)
    });
}
