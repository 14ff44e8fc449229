use std::f64::consts::PI;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{error::CorpusError, export::ExportSink, geometry::R2};

use super::{Corpus, Frame, Seeding};

/// Where points are placed after the initial triangulation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Placement {
    /// Stretch the current layout over the region's bounding box.
    #[default]
    BoundingBox,
    /// Stretch the current layout over the square inscribed in the region.
    InscribedSquare,
    /// Leave positions as they are.
    Keep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelaxConfig {
    /// Multiplier applied to every spring force.
    pub stiffness: f64,
    /// A step converges when no point is pushed further than this.
    pub min_dist: f64,
    /// Drift since the last triangulation that triggers a new one.
    pub max_dist: f64,
    /// Maximum number of steps; `None` runs until convergence.
    pub limit: Option<usize>,
    /// Export every this many steps; 0 disables periodic export.
    pub export_period: usize,
    pub placement: Placement,
}

impl Default for RelaxConfig {
    fn default() -> Self {
        RelaxConfig {
            stiffness: 1.,
            min_dist: 0.001,
            max_dist: 0.05,
            limit: Some(1000),
            export_period: 0,
            placement: Placement::default(),
        }
    }
}

/// How a relaxation ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Exit {
    Converged,
    /// Hit the step limit before converging.
    ForcedExit,
    /// A re-triangulation failed mid-loop; positions are those of the last step.
    TriangulationFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relaxation {
    pub steps: usize,
    pub retriangulations: usize,
    pub exit: Exit,
    pub l0: f64,
}

impl Relaxation {
    pub fn is_converged(&self) -> bool {
        self.exit == Exit::Converged
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StepOutcome {
    pub converged: bool,
    pub retriangulate: bool,
    pub max_push: f64,
}

impl Corpus {
    /// Rest length of a uniform triangular lattice with this many points over
    /// the region's area.
    pub fn rest_length(&self) -> f64 {
        let uniform_density = self.points.len() as f64 / self.region.area().abs();
        (2. / (3_f64.sqrt() * uniform_density)).sqrt()
    }

    /// Scale `l0` so that density-weighted target lengths average out to `l0`
    /// over the current neighbor pairs.
    pub fn scaling_factor(&self, l0: f64) -> f64 {
        let mut pairs = 0;
        let mut target = 0.;
        for p in &self.points {
            for &j in &p.neighbors {
                let h = self.density.at(&p.midpoint(&self.points[j]));
                pairs += 1;
                target += 1. / (h * h);
            }
        }
        if pairs == 0 || !(target > 0.) {
            return l0;
        }
        (pairs as f64 * l0 * l0 / target).sqrt()
    }

    /// One relaxation step: accumulate spring pushes, correct them against the
    /// region, integrate.
    pub fn step(&mut self, l0: f64, config: &RelaxConfig) -> StepOutcome {
        let h_scale = self.scaling_factor(l0);
        let mut pushes = vec![R2::zero(); self.points.len()];
        for (i, p) in self.points.iter().enumerate() {
            for &j in &p.neighbors {
                let q = &self.points[j];
                let f = h_scale / self.density.at(&p.midpoint(q)) - p.distance_to(q);
                if f > 0. {
                    // Coincident pairs get opposite directions, by index
                    let angle = if p.position == q.position {
                        if i < j { 0. } else { PI }
                    } else {
                        p.position.angle_to(&q.position)
                    };
                    pushes[j] += R2::polar(config.stiffness * f, angle);
                }
            }
        }

        let Corpus { points, region, .. } = self;
        let mut outcome = StepOutcome { converged: true, retriangulate: false, max_push: 0. };
        for (point, push) in points.iter_mut().zip(pushes) {
            point.push += push;
            let containment = region.containment(&point.position, &point.push);
            if !containment.inside {
                point.move_to(containment.nearest);
            }
            let magnitude = point.push.norm();
            if magnitude > config.min_dist {
                outcome.converged = false;
            }
            outcome.max_push = outcome.max_push.max(magnitude);
            point.update();
            if point.drift() > config.max_dist {
                outcome.retriangulate = true;
            }
        }
        outcome
    }

    /// Relax the layout until no point moves further than `min_dist` in a step,
    /// or `limit` steps have run.
    ///
    /// Fails only if the initial triangulation fails; a failed re-triangulation
    /// mid-loop ends the relaxation with [`Exit::TriangulationFailed`].
    pub fn unispring(
        &mut self,
        config: &RelaxConfig,
        sink: Option<&mut dyn ExportSink>,
    ) -> Result<Relaxation, CorpusError> {
        self.triangulate()?;
        match config.placement {
            Placement::BoundingBox => self.pre_uniformization(Seeding::Resize, Frame::BoundingBox)?,
            Placement::InscribedSquare => self.pre_uniformization(Seeding::Resize, Frame::InscribedSquare)?,
            Placement::Keep => {}
        }
        let l0 = self.rest_length();
        info!("l0: {:.6} ({} points, area {:.4})", l0, self.points.len(), self.region.area().abs());
        Ok(self.relax(l0, config, sink))
    }

    /// Step loop of [`Corpus::unispring`], starting from the current neighbor
    /// sets and origins. Neighbor sets are cleared on every exit.
    pub fn relax(&mut self, l0: f64, config: &RelaxConfig, mut sink: Option<&mut dyn ExportSink>) -> Relaxation {
        let mut steps = 0;
        let mut retriangulations = 0;
        let exit = loop {
            steps += 1;
            let outcome = self.step(l0, config);
            debug!("step {}: max push {:.6}", steps, outcome.max_push);
            if outcome.retriangulate && !outcome.converged {
                match self.triangulate() {
                    Ok(_) => retriangulations += 1,
                    Err(e) => {
                        warn!("re-triangulation failed at step {}: {}", steps, e);
                        break Exit::TriangulationFailed;
                    }
                }
            }
            if config.export_period > 0 && steps % config.export_period == 0 {
                if let Some(sink) = sink.as_deref_mut() {
                    self.export(sink);
                }
            }
            if outcome.converged {
                break Exit::Converged;
            }
            if let Some(limit) = config.limit {
                if steps >= limit {
                    warn!("forced exit after {} steps", steps);
                    break Exit::ForcedExit;
                }
            }
        };
        for p in &mut self.points {
            p.neighbors.clear();
        }
        info!("{:?} after {} steps, {} re-triangulations", exit, steps, retriangulations);
        Relaxation { steps, retriangulations, exit, l0 }
    }
}
