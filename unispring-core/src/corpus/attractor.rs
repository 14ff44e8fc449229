//! One-shot pull of the layout toward fixed centers.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{error::CorpusError, geometry::R2};

use super::Corpus;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttractorSpec {
    center: R2<f64>,
    radius: f64,
    strength: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AttractorSpec", rename_all = "camelCase")]
pub struct Attractor {
    center: R2<f64>,
    /// Distance at which the pull peaks.
    radius: f64,
    /// Peak pull.
    strength: f64,
}

impl TryFrom<AttractorSpec> for Attractor {
    type Error = CorpusError;
    fn try_from(spec: AttractorSpec) -> Result<Self, Self::Error> {
        Attractor::new(spec.center, spec.radius, spec.strength)
    }
}

impl Attractor {
    pub fn new(center: R2<f64>, radius: f64, strength: f64) -> Result<Self, CorpusError> {
        if !(radius > 0.) || !radius.is_finite() {
            return Err(CorpusError::InvalidParameter { name: "radius", value: radius });
        }
        for value in [center.x, center.y, strength] {
            if !value.is_finite() {
                return Err(CorpusError::InvalidParameter { name: "attractor", value });
            }
        }
        Ok(Attractor { center, radius, strength })
    }

    pub fn center(&self) -> R2<f64> {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Derivative-of-Gaussian falloff, peaking at `strength` when `d == radius`.
    pub fn falloff(&self, d: f64) -> f64 {
        let u = d / self.radius;
        self.strength * u * (0.5 - u * u / 2.).exp()
    }

    /// Resistance to the pull; grows as `(d / radius)^4` past the radius.
    pub fn stiffness(&self, d: f64) -> f64 {
        1. + (d / self.radius).powi(4)
    }
}

fn default_safe_margin() -> f64 {
    0.05
}

fn default_safe_stiffness() -> f64 {
    4.
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttractorConfigSpec {
    #[serde(default)]
    attractors: Vec<Attractor>,
    #[serde(default = "default_safe_margin")]
    safe_margin: f64,
    #[serde(default = "default_safe_stiffness")]
    safe_stiffness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AttractorConfigSpec", rename_all = "camelCase")]
pub struct AttractorConfig {
    attractors: Vec<Attractor>,
    /// Inset of the safe box from the region's bounding box.
    safe_margin: f64,
    /// Extra stiffness for points outside the safe box.
    safe_stiffness: f64,
}

impl TryFrom<AttractorConfigSpec> for AttractorConfig {
    type Error = CorpusError;
    fn try_from(spec: AttractorConfigSpec) -> Result<Self, Self::Error> {
        AttractorConfig::new(spec.attractors).with_safe_box(spec.safe_margin, spec.safe_stiffness)
    }
}

impl Default for AttractorConfig {
    fn default() -> Self {
        AttractorConfig::new(vec![])
    }
}

impl AttractorConfig {
    /// Default safe box: 0.05 inset, 4x stiffness outside it.
    pub fn new(attractors: Vec<Attractor>) -> Self {
        AttractorConfig {
            attractors,
            safe_margin: default_safe_margin(),
            safe_stiffness: default_safe_stiffness(),
        }
    }

    pub fn with_safe_box(self, margin: f64, stiffness: f64) -> Result<Self, CorpusError> {
        if !margin.is_finite() {
            return Err(CorpusError::InvalidParameter { name: "safeMargin", value: margin });
        }
        if !(stiffness > 0.) || !stiffness.is_finite() {
            return Err(CorpusError::InvalidParameter { name: "safeStiffness", value: stiffness });
        }
        Ok(AttractorConfig { safe_margin: margin, safe_stiffness: stiffness, ..self })
    }

    pub fn attractors(&self) -> &[Attractor] {
        &self.attractors
    }

    pub fn safe_margin(&self) -> f64 {
        self.safe_margin
    }

    pub fn safe_stiffness(&self) -> f64 {
        self.safe_stiffness
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttractReport {
    pub moved: usize,
    pub max_displacement: f64,
}

impl Corpus {
    /// Displace every point toward the attractors, then keep it inside the
    /// region. Each attractor's pull is capped at the point's distance to its
    /// center.
    pub fn attract(&mut self, config: &AttractorConfig) -> AttractReport {
        let safe = self.region.bounding_box().shrink(config.safe_margin);
        let Corpus { points, region, .. } = self;
        let mut report = AttractReport::default();
        for point in points.iter_mut() {
            let outside_safe = !safe.contains(&point.position);
            for attractor in &config.attractors {
                let offset = attractor.center - point.position;
                let d = offset.norm();
                if d == 0. {
                    continue;
                }
                let mut stiffness = attractor.stiffness(d);
                if outside_safe {
                    stiffness *= config.safe_stiffness;
                }
                let magnitude = (attractor.falloff(d) / stiffness).min(d);
                point.push += offset * (magnitude / d);
            }
            let containment = region.containment(&point.position, &point.push);
            if !containment.inside {
                point.move_to(containment.nearest);
            }
            let displacement = point.push.norm();
            if displacement > 0. {
                report.moved += 1;
                report.max_displacement = report.max_displacement.max(displacement);
            }
            point.update();
        }
        debug!("attract: {} points moved, max displacement {:.6}", report.moved, report.max_displacement);
        report
    }
}
