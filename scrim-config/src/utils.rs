use knuffel::errors::DecodeError;
use tracing::warn;

/// A number that may be written either as an integer or as a decimal literal.
///
/// KDL distinguishes `100` from `100.0`; users should not have to. Values outside `MIN..=MAX` are
/// clamped, and anything that is not a number decodes to NaN, which normalization replaces with
/// the field's default.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FloatOrInt<const MIN: i32, const MAX: i32>(pub f64);

impl<const MIN: i32, const MAX: i32> FloatOrInt<MIN, MAX> {
    /// The value, or `None` if it did not decode to a finite number.
    pub fn finite(self) -> Option<f64> {
        self.0.is_finite().then_some(self.0)
    }

    fn clamped(v: f64) -> Self {
        let (min, max) = (f64::from(MIN), f64::from(MAX));
        if (min..=max).contains(&v) {
            FloatOrInt(v)
        } else {
            warn!("value {v} must be between {MIN} and {MAX}, clamping");
            FloatOrInt(v.clamp(min, max))
        }
    }
}

impl<S: knuffel::traits::ErrorSpan, const MIN: i32, const MAX: i32> knuffel::DecodeScalar<S>
    for FloatOrInt<MIN, MAX>
{
    fn type_check(
        type_name: &Option<knuffel::span::Spanned<knuffel::ast::TypeName, S>>,
        ctx: &mut knuffel::decode::Context<S>,
    ) {
        if let Some(type_name) = &type_name {
            ctx.emit_error(DecodeError::unexpected(
                type_name,
                "type name",
                "no type name expected for this node",
            ));
        }
    }

    fn raw_decode(
        val: &knuffel::span::Spanned<knuffel::ast::Literal, S>,
        _ctx: &mut knuffel::decode::Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        let value = match &**val {
            knuffel::ast::Literal::Int(ref value) => match i64::try_from(value) {
                Ok(v) => Self::clamped(v as f64),
                Err(err) => {
                    warn!("integer out of range, using the default: {err}");
                    FloatOrInt(f64::NAN)
                }
            },
            knuffel::ast::Literal::Decimal(ref value) => match f64::try_from(value) {
                Ok(v) if v.is_finite() => Self::clamped(v),
                Ok(v) => {
                    warn!("number must be finite, got {v}, using the default");
                    FloatOrInt(f64::NAN)
                }
                Err(err) => {
                    warn!("invalid number, using the default: {err}");
                    FloatOrInt(f64::NAN)
                }
            },
            other => {
                warn!("expected a number, got {other:?}, using the default");
                FloatOrInt(f64::NAN)
            }
        };
        Ok(value)
    }
}

/// Unbounded-in-practice number used by most numeric config fields.
///
/// Range checks happen during normalization, which coerces instead of rejecting.
pub type Number = FloatOrInt<-1_000_000, 1_000_000>;
