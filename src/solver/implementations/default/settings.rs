use crate::{algebra::*, solver::core::SettingsError};
use derive_builder::Builder;

/// Settings for the [`DefaultSolver`](super::DefaultSolver)

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct DefaultSettings<T: FloatT> {
    ///maximum number of iterations
    #[builder(default = "200")]
    pub max_iter: u32,

    ///maximum run time (seconds)
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    ///verbose printing
    #[builder(default = "true")]
    pub verbose: bool,

    ///maximum interior point step length
    #[builder(default = "(0.99).as_T()")]
    pub max_step_fraction: T,

    ///absolute duality gap tolerance
    #[builder(default = "(1e-8).as_T()")]
    pub tol_gap_abs: T,

    ///relative duality gap tolerance
    #[builder(default = "(1e-8).as_T()")]
    pub tol_gap_rel: T,

    ///feasibility check tolerance (primal and dual)
    #[builder(default = "(1e-8).as_T()")]
    pub tol_feas: T,

    ///keep iterates inside the wide central path neighborhood
    #[builder(default = "true")]
    pub neighborhood_enable: bool,

    ///neighborhood width.  Pairwise products must stay above
    ///(1 - nbh_ubnd) times the duality measure
    #[builder(default = "(0.99).as_T()")]
    pub nbh_ubnd: T,

    ///minimum step size allowed before terminating
    #[builder(default = "(1e-8).as_T()")]
    pub min_step_length: T,
}

impl<T> Default for DefaultSettings<T>
where
    T: FloatT,
{
    fn default() -> DefaultSettings<T> {
        DefaultSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> DefaultSettings<T>
where
    T: FloatT,
{
    /// Checks that the settings are valid.  Tolerances must be
    /// nonnegative and fractions must lie in (0,1].
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_fraction(self.max_step_fraction, "max_step_fraction")?;
        validate_fraction(self.nbh_ubnd, "nbh_ubnd")?;
        validate_tolerance(self.tol_gap_abs, "tol_gap_abs")?;
        validate_tolerance(self.tol_gap_rel, "tol_gap_rel")?;
        validate_tolerance(self.tol_feas, "tol_feas")?;
        validate_tolerance(self.min_step_length, "min_step_length")?;
        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for DefaultSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        DefaultSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> DefaultSettingsBuilder<T>
where
    T: FloatT,
{
    /// check any fields that have been set explicitly
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(v) = self.max_step_fraction {
            validate_fraction(v, "max_step_fraction")?;
        }
        if let Some(v) = self.nbh_ubnd {
            validate_fraction(v, "nbh_ubnd")?;
        }
        if let Some(v) = self.tol_gap_abs {
            validate_tolerance(v, "tol_gap_abs")?;
        }
        if let Some(v) = self.tol_gap_rel {
            validate_tolerance(v, "tol_gap_rel")?;
        }
        if let Some(v) = self.tol_feas {
            validate_tolerance(v, "tol_feas")?;
        }
        if let Some(v) = self.min_step_length {
            validate_tolerance(v, "min_step_length")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_fraction<T: FloatT>(v: T, field: &'static str) -> Result<(), SettingsError> {
    if v > T::zero() && v <= T::one() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

fn validate_tolerance<T: FloatT>(v: T, field: &'static str) -> Result<(), SettingsError> {
    if v >= T::zero() && v.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings should validate
    let settings = DefaultSettings::<f64>::default();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.max_iter, 200);
    assert_eq!(settings.nbh_ubnd, 0.99);

    // bad step fraction through the builder
    let built = DefaultSettingsBuilder::<f64>::default()
        .max_step_fraction(1.5)
        .build();
    assert!(built.is_err());

    // bad tolerance set directly
    let mut settings = DefaultSettings::<f64>::default();
    settings.tol_feas = -1.0;
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadFieldValue("tol_feas"))
    );

    let built = DefaultSettingsBuilder::<f64>::default()
        .verbose(false)
        .nbh_ubnd(0.5)
        .build()
        .unwrap();
    assert!(!built.verbose);
    assert_eq!(built.nbh_ubnd, 0.5);
}
