use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::{sync::mpsc, time};

use crate::models::{AccelerationSample, MotionReading};

use super::source::MotionSource;

const GRAVITY: f64 = 9.81;

/// Synthetic gravity-inclusive signal of someone walking with the phone in a
/// pocket: gravity on z, a sharp heel-strike jolt once per step that decays
/// over the following samples, and uniform sensor noise on every axis.
pub struct GaitSignal {
    samples_per_step: u64,
    impact: f64,
    decay: f64,
    noise: f64,
    pulse: f64,
    index: u64,
    rng: StdRng,
}

impl GaitSignal {
    pub fn new(sample_rate_hz: f64, cadence_hz: f64, seed: u64) -> Self {
        let samples_per_step = (sample_rate_hz / cadence_hz.max(0.1)).round().max(2.0) as u64;
        Self {
            samples_per_step,
            impact: 16.0,
            decay: 0.5,
            noise: 0.3,
            pulse: 0.0,
            index: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_impact(mut self, impact: f64) -> Self {
        self.impact = impact;
        self
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise.abs();
        self
    }

    pub fn samples_per_step(&self) -> u64 {
        self.samples_per_step
    }

    fn jitter(&mut self) -> f64 {
        if self.noise == 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-self.noise..self.noise)
    }
}

impl Iterator for GaitSignal {
    type Item = AccelerationSample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index > 0 && self.index % self.samples_per_step == 0 {
            self.pulse = self.impact;
        } else {
            self.pulse *= self.decay;
        }
        self.index += 1;

        let x = self.jitter();
        let y = self.jitter();
        let z = GRAVITY + self.pulse + self.jitter();
        Some(AccelerationSample::new(x, y, z))
    }
}

/// A motion source that plays a [`GaitSignal`] in real time.
pub struct SimulatedWalk {
    signal: GaitSignal,
    period: Duration,
}

impl SimulatedWalk {
    pub fn new(sample_rate_hz: f64, cadence_hz: f64, seed: u64) -> Self {
        let rate = sample_rate_hz.max(1.0);
        Self {
            signal: GaitSignal::new(rate, cadence_hz, seed),
            period: Duration::from_secs_f64(1.0 / rate),
        }
    }
}

impl Default for SimulatedWalk {
    fn default() -> Self {
        Self::new(50.0, 1.8, rand::thread_rng().gen())
    }
}

impl MotionSource for SimulatedWalk {
    fn is_supported(&self) -> bool {
        true
    }

    fn into_feed(self: Box<Self>) -> Option<mpsc::Receiver<MotionReading>> {
        let (sender, receiver) = mpsc::channel(64);
        let SimulatedWalk { mut signal, period } = *self;

        tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(sample) = signal.next() else {
                    break;
                };
                if sender.send(MotionReading::from_sample(sample)).await.is_err() {
                    break;
                }
            }
        });

        Some(receiver)
    }
}
