use super::InterpMethod;

/// 오름차순으로 정렬된 1차원 표. 자연 3차 스플라인 계수를 미리 계산해 둔다.
#[derive(Debug, Clone)]
pub struct Curve {
    knots: Vec<f64>,
    values: Vec<f64>,
    second_derivs: Vec<f64>,
}

impl Curve {
    /// `knots`는 중복 없이 오름차순이어야 한다(호출자가 보장).
    pub fn new(knots: Vec<f64>, values: Vec<f64>) -> Self {
        let second_derivs = natural_second_derivatives(&knots, &values);
        Self {
            knots,
            values,
            second_derivs,
        }
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn evaluate(&self, x: f64, method: InterpMethod, fill_value: f64) -> f64 {
        if x.is_nan() {
            return fill_value;
        }
        match method {
            InterpMethod::Linear => self.linear(x).unwrap_or(fill_value),
            InterpMethod::Nearest => self.nearest(x),
            InterpMethod::Cubic => self.cubic(x).unwrap_or(fill_value),
        }
    }

    /// `x`가 놓인 구간의 왼쪽 매듭 인덱스. 범위 밖이면 `None`.
    fn segment(&self, x: f64) -> Option<usize> {
        let first = *self.knots.first()?;
        let last = *self.knots.last()?;
        if x < first || x > last {
            return None;
        }
        // x 이하인 마지막 매듭
        Some(self.knots.partition_point(|k| *k <= x) - 1)
    }

    fn linear(&self, x: f64) -> Option<f64> {
        let i = self.segment(x)?;
        if i + 1 == self.knots.len() {
            return Some(self.values[i]);
        }
        let (x0, x1) = (self.knots[i], self.knots[i + 1]);
        let (y0, y1) = (self.values[i], self.values[i + 1]);
        let frac = (x - x0) / (x1 - x0);
        Some(y0 + frac * (y1 - y0))
    }

    fn nearest(&self, x: f64) -> f64 {
        let n = self.knots.len();
        let i = self.knots.partition_point(|k| *k < x);
        if i == 0 {
            return self.values[0];
        }
        if i == n {
            return self.values[n - 1];
        }
        // 정확히 중간이면 아래쪽 매듭
        if self.knots[i] - x < x - self.knots[i - 1] {
            self.values[i]
        } else {
            self.values[i - 1]
        }
    }

    fn cubic(&self, x: f64) -> Option<f64> {
        if self.knots.len() < 3 {
            return self.linear(x);
        }
        let i = self.segment(x)?;
        if i + 1 == self.knots.len() {
            return Some(self.values[i]);
        }
        let h = self.knots[i + 1] - self.knots[i];
        let a = (self.knots[i + 1] - x) / h;
        let b = (x - self.knots[i]) / h;
        let m0 = self.second_derivs[i];
        let m1 = self.second_derivs[i + 1];
        Some(
            a * self.values[i]
                + b * self.values[i + 1]
                + ((a * a * a - a) * m0 + (b * b * b - b) * m1) * h * h / 6.0,
        )
    }
}

/// 양 끝 2차 도함수가 0인 자연 스플라인의 매듭별 2차 도함수(삼중대각 행렬 풀이).
fn natural_second_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut m = vec![0.0; n];
    if n < 3 {
        return m;
    }
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];
    for i in 1..n - 1 {
        let h0 = x[i] - x[i - 1];
        let h1 = x[i + 1] - x[i];
        let diag = 2.0 * (h0 + h1);
        let rhs = 6.0 * ((y[i + 1] - y[i]) / h1 - (y[i] - y[i - 1]) / h0);
        let denom = diag - h0 * c_prime[i - 1];
        c_prime[i] = h1 / denom;
        d_prime[i] = (rhs - h0 * d_prime[i - 1]) / denom;
    }
    for i in (1..n - 1).rev() {
        m[i] = d_prime[i] - c_prime[i] * m[i + 1];
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squares() -> Curve {
        Curve::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 4.0, 9.0])
    }

    #[test]
    fn linear_hits_knots_and_midpoints() {
        let c = squares();
        assert_eq!(c.evaluate(2.0, InterpMethod::Linear, f64::NAN), 4.0);
        assert_eq!(c.evaluate(3.0, InterpMethod::Linear, f64::NAN), 9.0);
        assert!((c.evaluate(2.5, InterpMethod::Linear, f64::NAN) - 6.5).abs() < 1e-12);
    }

    #[test]
    fn linear_outside_returns_fill() {
        let c = squares();
        assert!(c.evaluate(-0.1, InterpMethod::Linear, f64::NAN).is_nan());
        assert_eq!(c.evaluate(3.5, InterpMethod::Linear, -1.0), -1.0);
    }

    #[test]
    fn nearest_extrapolates_and_rounds_half_down() {
        let c = squares();
        assert_eq!(c.evaluate(1.5, InterpMethod::Nearest, f64::NAN), 1.0);
        assert_eq!(c.evaluate(1.6, InterpMethod::Nearest, f64::NAN), 4.0);
        assert_eq!(c.evaluate(10.0, InterpMethod::Nearest, f64::NAN), 9.0);
        assert_eq!(c.evaluate(-10.0, InterpMethod::Nearest, f64::NAN), 0.0);
    }

    #[test]
    fn cubic_reproduces_knots_and_stays_smooth() {
        let c = squares();
        assert_eq!(c.evaluate(1.0, InterpMethod::Cubic, f64::NAN), 1.0);
        let mid = c.evaluate(1.5, InterpMethod::Cubic, f64::NAN);
        assert!(mid > 1.0 && mid < 4.0, "mid={mid}");
        assert!(c.evaluate(4.0, InterpMethod::Cubic, f64::NAN).is_nan());
    }

    #[test]
    fn cubic_on_line_is_exact() {
        let c = Curve::new(vec![0.0, 1.0, 3.0, 4.0], vec![1.0, 3.0, 7.0, 9.0]);
        assert!((c.evaluate(2.2, InterpMethod::Cubic, f64::NAN) - 5.4).abs() < 1e-12);
    }
}
