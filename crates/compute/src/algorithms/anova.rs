//! One-way analysis of variance.

use serde::{Deserialize, Serialize};

use super::distributions::f_survival;

/// Raw one-way ANOVA result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anova {
    pub f_statistic: f64,
    pub p_value: f64,
    pub df_between: usize,
    pub df_within: usize,
}

/// One-way ANOVA across `groups`.
///
/// Undefined (`None`) with fewer than two non-empty groups, no within-group
/// degrees of freedom, or zero within-group variance (F is not finite).
pub fn one_way_anova(groups: &[&[f64]]) -> Option<Anova> {
    let groups: Vec<&[f64]> = groups.iter().copied().filter(|g| !g.is_empty()).collect();
    let k = groups.len();
    let n: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || n <= k {
        return None;
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for g in &groups {
        let m = g.iter().sum::<f64>() / g.len() as f64;
        ss_between += g.len() as f64 * (m - grand_mean).powi(2);
        ss_within += g.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    }

    let df_between = k - 1;
    let df_within = n - k;
    let ms_within = ss_within / df_within as f64;
    if !(ms_within > 0.0) {
        return None;
    }
    let f_statistic = (ss_between / df_between as f64) / ms_within;
    if !f_statistic.is_finite() {
        return None;
    }
    let p_value = f_survival(f_statistic, df_between as f64, df_within as f64);
    if !p_value.is_finite() {
        return None;
    }

    Some(Anova {
        f_statistic,
        p_value: p_value.clamp(0.0, 1.0),
        df_between,
        df_within,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_groups_reference() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        let r = one_way_anova(&[&a, &b]).unwrap();
        assert!((r.f_statistic - 13.5).abs() < 1e-10);
        assert_eq!(r.df_between, 1);
        assert_eq!(r.df_within, 4);
        assert!(r.p_value > 0.015 && r.p_value < 0.03, "p={}", r.p_value);
    }

    #[test]
    fn large_effect_is_tiny_p() {
        let a = [0.9, 0.88, 0.91];
        let b = [0.1, 0.12, 0.09];
        let r = one_way_anova(&[&a, &b]).unwrap();
        assert!(r.f_statistic > 1000.0);
        assert!(r.p_value < 0.001);
    }

    #[test]
    fn identical_groups_have_zero_f() {
        let a = [0.1, 0.2, 0.3];
        let r = one_way_anova(&[&a, &a]).unwrap();
        assert!(r.f_statistic.abs() < 1e-12);
        assert!((r.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_inputs_are_undefined() {
        assert!(one_way_anova(&[&[1.0, 2.0]]).is_none());
        assert!(one_way_anova(&[&[1.0], &[2.0]]).is_none());
        assert!(one_way_anova(&[&[0.5, 0.5], &[0.2, 0.2]]).is_none());
        assert!(one_way_anova(&[]).is_none());
    }
}
