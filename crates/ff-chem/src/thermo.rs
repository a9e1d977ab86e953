//! NASA 7-coefficient polynomial thermodynamics.

use crate::species::Species;

/// Two-range NASA polynomial fit for one species.
///
/// Non-dimensional forms: `cp/R`, `h/(RT)`, `s/R` at the reference pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nasa7 {
    pub t_mid: f64,
    pub low: [f64; 7],
    pub high: [f64; 7],
}

impl Nasa7 {
    fn coeffs(&self, t: f64) -> &[f64; 7] {
        if t < self.t_mid { &self.low } else { &self.high }
    }

    pub fn cp_r(&self, t: f64) -> f64 {
        let a = self.coeffs(t);
        a[0] + t * (a[1] + t * (a[2] + t * (a[3] + t * a[4])))
    }

    pub fn h_rt(&self, t: f64) -> f64 {
        let a = self.coeffs(t);
        a[0] + t * (a[1] / 2.0 + t * (a[2] / 3.0 + t * (a[3] / 4.0 + t * a[4] / 5.0))) + a[5] / t
    }

    pub fn s_r(&self, t: f64) -> f64 {
        let a = self.coeffs(t);
        a[0] * t.ln() + t * (a[1] + t * (a[2] / 2.0 + t * (a[3] / 3.0 + t * a[4] / 4.0))) + a[6]
    }

    /// Standard-state Gibbs energy `g°/(RT)`.
    pub fn g_rt(&self, t: f64) -> f64 {
        self.h_rt(t) - self.s_r(t)
    }
}

/// GRI-Mech 3.0 style fits; the ion and electron entries follow the usual
/// flame-ion mechanisms.
pub fn nasa7(species: Species) -> Nasa7 {
    match species {
        Species::CH4 => Nasa7 {
            t_mid: 1000.0,
            low: [
                5.149_876_13,
                -1.367_097_88e-2,
                4.918_005_99e-5,
                -4.847_430_26e-8,
                1.666_939_56e-11,
                -1.024_664_76e4,
                -4.641_303_76,
            ],
            high: [
                7.485_149_50e-2,
                1.339_094_67e-2,
                -5.732_858_09e-6,
                1.222_925_35e-9,
                -1.018_152_30e-13,
                -9.468_344_59e3,
                1.843_731_80e1,
            ],
        },
        Species::O2 => Nasa7 {
            t_mid: 1000.0,
            low: [
                3.782_456_36,
                -2.996_734_16e-3,
                9.847_302_01e-6,
                -9.681_295_09e-9,
                3.243_728_37e-12,
                -1.063_943_56e3,
                3.657_675_73,
            ],
            high: [
                3.282_537_84,
                1.483_087_54e-3,
                -7.579_666_69e-7,
                2.094_705_55e-10,
                -2.167_177_94e-14,
                -1.088_457_72e3,
                5.453_231_29,
            ],
        },
        Species::H2 => Nasa7 {
            t_mid: 1000.0,
            low: [
                2.344_331_12,
                7.980_520_75e-3,
                -1.947_815_10e-5,
                2.015_720_94e-8,
                -7.376_117_61e-12,
                -9.179_351_73e2,
                6.830_102_38e-1,
            ],
            high: [
                3.337_279_20,
                -4.940_247_31e-5,
                4.994_567_78e-7,
                -1.795_663_94e-10,
                2.002_553_76e-14,
                -9.501_589_22e2,
                -3.205_023_31,
            ],
        },
        Species::H2O => Nasa7 {
            t_mid: 1000.0,
            low: [
                4.198_640_56,
                -2.036_434_10e-3,
                6.520_402_11e-6,
                -5.487_970_62e-9,
                1.771_978_17e-12,
                -3.029_372_67e4,
                -8.490_322_08e-1,
            ],
            high: [
                3.033_992_49,
                2.176_918_04e-3,
                -1.640_725_18e-7,
                -9.704_198_70e-11,
                1.682_009_92e-14,
                -3.000_429_71e4,
                4.966_770_10,
            ],
        },
        Species::CO => Nasa7 {
            t_mid: 1000.0,
            low: [
                3.579_533_47,
                -6.103_536_80e-4,
                1.016_814_33e-6,
                9.070_058_84e-10,
                -9.044_244_99e-13,
                -1.434_408_60e4,
                3.508_409_28,
            ],
            high: [
                2.715_185_61,
                2.062_527_43e-3,
                -9.988_257_71e-7,
                2.300_530_08e-10,
                -2.036_477_16e-14,
                -1.415_187_24e4,
                7.818_687_72,
            ],
        },
        Species::CO2 => Nasa7 {
            t_mid: 1000.0,
            low: [
                2.356_773_52,
                8.984_596_77e-3,
                -7.123_562_69e-6,
                2.459_190_22e-9,
                -1.436_995_48e-13,
                -4.837_196_97e4,
                9.901_052_22,
            ],
            high: [
                3.857_460_29,
                4.414_370_26e-3,
                -2.214_814_04e-6,
                5.234_901_88e-10,
                -4.720_841_64e-14,
                -4.875_916_60e4,
                2.271_638_06,
            ],
        },
        Species::N2 => Nasa7 {
            t_mid: 1000.0,
            low: [
                3.298_677,
                1.408_240_4e-3,
                -3.963_222e-6,
                5.641_515e-9,
                -2.444_854e-12,
                -1.020_899_9e3,
                3.950_372,
            ],
            high: [
                2.926_64,
                1.487_976_8e-3,
                -5.684_76e-7,
                1.009_703_8e-10,
                -6.753_351e-15,
                -9.227_977e2,
                5.980_528,
            ],
        },
        Species::H3OPlus => Nasa7 {
            t_mid: 1000.0,
            low: [
                3.792_952_51,
                -9.108_527_23e-4,
                1.163_635_21e-5,
                -1.213_648_65e-8,
                4.261_596_24e-12,
                7.075_124_01e4,
                1.471_569_27,
            ],
            high: [
                2.496_477_65,
                5.728_448_40e-3,
                -1.839_532_39e-6,
                2.735_773_48e-10,
                -1.540_939_17e-14,
                7.097_291_13e4,
                7.458_507_79,
            ],
        },
        Species::Electron => Nasa7 {
            t_mid: 1000.0,
            low: [2.5, 0.0, 0.0, 0.0, 0.0, -745.375, -11.720_8],
            high: [2.5, 0.0, 0.0, 0.0, 0.0, -745.375, -11.720_8],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_meet_at_t_mid() {
        for sp in Species::ALL {
            let fit = nasa7(sp);
            let below = fit.t_mid - 1e-9;
            let above = fit.t_mid;
            assert!((fit.cp_r(below) - fit.cp_r(above)).abs() < 5e-2, "{sp} cp");
            assert!((fit.h_rt(below) - fit.h_rt(above)).abs() < 5e-2, "{sp} h");
        }
    }

    #[test]
    fn formation_enthalpies_are_plausible() {
        // h(298.15)/R in K, compared with tabulated formation enthalpies
        let h = |sp| nasa7(sp).h_rt(298.15) * 298.15 * 8.314_462_618e-3;
        assert!(h(Species::O2).abs() < 0.1);
        assert!(h(Species::N2).abs() < 0.1);
        assert!((h(Species::H2O) + 241.8).abs() < 0.5);
        assert!((h(Species::CO2) + 393.5).abs() < 0.5);
        assert!((h(Species::CO) + 110.5).abs() < 0.5);
        assert!((h(Species::CH4) + 74.9).abs() < 0.5);
        assert!(h(Species::H3OPlus) > 500.0);
    }

    #[test]
    fn monatomic_electron_cp() {
        let fit = nasa7(Species::Electron);
        assert_eq!(fit.cp_r(300.0), 2.5);
        assert_eq!(fit.cp_r(3000.0), 2.5);
    }
}
