use std::time::Duration;

/// Upper bound on how long a spring may take to settle.
///
/// Springs without damping never settle on their own.
const MAX_DURATION: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct SpringParams {
    pub damping: f64,
    pub mass: f64,
    pub stiffness: f64,
    pub epsilon: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Spring {
    pub from: f64,
    pub to: f64,
    pub initial_velocity: f64,
    pub params: SpringParams,
}

impl SpringParams {
    pub fn new(damping_ratio: f64, stiffness: f64, epsilon: f64) -> Self {
        let damping_ratio = damping_ratio.max(0.);
        let stiffness = stiffness.max(0.);
        let epsilon = epsilon.max(f64::EPSILON);

        let mass = 1.;
        let critical_damping = 2. * (mass * stiffness).sqrt();
        let damping = damping_ratio * critical_damping;

        Self {
            damping,
            mass,
            stiffness,
            epsilon,
        }
    }
}

impl From<scrim_config::SpringParams> for SpringParams {
    fn from(config: scrim_config::SpringParams) -> Self {
        Self::new(config.damping_ratio, config.stiffness, config.epsilon)
    }
}

impl Spring {
    pub fn value_at(&self, t: Duration) -> f64 {
        self.oscillate(t.as_secs_f64())
    }

    /// Computes and returns the duration until the spring is at rest.
    pub fn duration(&self) -> Duration {
        const DELTA: f64 = 0.001;

        let beta = self.params.damping / (2. * self.params.mass);

        if beta <= f64::EPSILON {
            return MAX_DURATION;
        }

        if (self.to - self.from).abs() <= f64::EPSILON && self.initial_velocity == 0. {
            return Duration::ZERO;
        }

        let omega0 = (self.params.stiffness / self.params.mass).sqrt();

        // As the first ansatz for the overdamped solution, and the general estimate for the
        // oscillating ones, take the time at which the envelope drops below epsilon.
        let mut x0 = -self.params.epsilon.ln() / beta;

        // f64::EPSILON is too small for this comparison, so use f32::EPSILON.
        if (beta - omega0).abs() <= f64::from(f32::EPSILON) || beta < omega0 {
            return clamp_secs(x0);
        }

        // The overdamped solution decays much slower than the envelope, so look at the
        // oscillation itself and find the root with Newton's method.
        let mut y0 = self.oscillate(x0);
        let m = (self.oscillate(x0 + DELTA) - y0) / DELTA;

        let mut x1 = (self.to - y0 + m * x0) / m;
        let mut y1 = self.oscillate(x1);

        let mut i = 0;
        while (self.to - y1).abs() > self.params.epsilon {
            if i > 1000 {
                return MAX_DURATION;
            }

            x0 = x1;
            y0 = y1;

            let m = (self.oscillate(x0 + DELTA) - y0) / DELTA;

            x1 = (self.to - y0 + m * x0) / m;
            y1 = self.oscillate(x1);

            i += 1;
        }

        clamp_secs(x1)
    }

    fn oscillate(&self, t: f64) -> f64 {
        let b = self.params.damping;
        let m = self.params.mass;
        let k = self.params.stiffness;
        let v0 = self.initial_velocity;

        let beta = b / (2. * m);
        let omega0 = (k / m).sqrt();

        let x0 = self.from - self.to;

        let envelope = (-beta * t).exp();

        // Solutions of the form C1*e^(lambda1*x) + C2*e^(lambda2*x) for the differential equation
        // m*ẍ+b*ẋ+kx = 0.

        // Critically damped.
        // f64::EPSILON is too small for this comparison, so use f32::EPSILON.
        if (beta - omega0).abs() <= f64::from(f32::EPSILON) {
            self.to + envelope * (x0 + (beta * x0 + v0) * t)
        }
        // Underdamped.
        else if beta < omega0 {
            let omega1 = ((omega0 * omega0) - (beta * beta)).sqrt();

            self.to
                + envelope
                    * (x0 * (omega1 * t).cos() + ((beta * x0 + v0) / omega1) * (omega1 * t).sin())
        }
        // Overdamped.
        else {
            let omega2 = ((beta * beta) - (omega0 * omega0)).sqrt();

            self.to
                + envelope
                    * (x0 * (omega2 * t).cosh() + ((beta * x0 + v0) / omega2) * (omega2 * t).sinh())
        }
    }
}

fn clamp_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs)
        .unwrap_or(MAX_DURATION)
        .min(MAX_DURATION)
}
