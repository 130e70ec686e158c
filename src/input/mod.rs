//! The YAML input file that drives a run

use std::path::Path;
use yaml_rust::{YamlLoader, yaml::Yaml};
use evalexpr::*;

use crate::constants::*;

mod error;
mod types;
mod timing;

pub use error::*;
use types::*;
pub use timing::*;

/// A parsed input file, together with the named values (masses,
/// units and user constants) that its expressions may refer to.
pub struct Config {
    input: Yaml,
    ctx: HashMapContext,
}

impl Config {
    /// Reads and parses the input file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|_| InputError::file())?;
        Self::from_string(&contents)
    }

    /// Parses the first YAML document in `s`.
    pub fn from_string(s: &str) -> Result<Self, InputError> {
        let input = YamlLoader::load_from_str(s)
            .map_err(|_| InputError::file())?;
        let input = input.first()
            .ok_or(InputError::file())?;

        Ok(Config {
            input: input.clone(),
            ctx: HashMapContext::new(),
        })
    }

    /// Defines particle masses, energy units and common functions
    /// for use in expressions, then evaluates the entries of `section`
    /// in order, each of which may refer to those before it.
    pub fn with_context(&mut self, section: &str) -> Result<&mut Self, InputError> {
        use helper::context_function;

        let mut ctx = context_map! {
            "mp" => PROTON_MASS,
            "mn" => NEUTRON_MASS,
            "md" => DEUTERON_MASS,
            "mhe3" => HELIUM_3_MASS,
            "mhe4" => HELIUM_4_MASS,
            "mpi0" => PI_0_MASS,
            "meta" => ETA_MASS,
            "GeV" => 1.0,
            "MeV" => 1.0e-3,
            "keV" => 1.0e-6,
            "pi" => std::f64::consts::PI,
            "degree" => std::f64::consts::PI / 180.0,
        }.map_err(|_| InputError::conversion(section, "default context"))?;

        context_function!(ctx, "sqrt",   f64::sqrt);
        context_function!(ctx, "abs",    f64::abs);
        context_function!(ctx, "exp",    f64::exp);
        context_function!(ctx, "ln",     f64::ln);
        context_function!(ctx, "sin",    f64::sin);
        context_function!(ctx, "cos",    f64::cos);
        context_function!(ctx, "tan",    f64::tan);
        context_function!(ctx, "acos",   f64::acos);
        context_function!(ctx, "atan2",  f64::atan2, 2);
        context_function!(ctx, "cosh",   f64::cosh);
        context_function!(ctx, "tanh",   f64::tanh);

        context_function!(ctx, "step",  |x: f64, min: f64, max: f64| {if x >= min && x < max {1.0} else {0.0}}, 3);
        context_function!(ctx, "gauss", |x: f64, mu: f64, sigma: f64| (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp(), 3);
        context_function!(ctx, "energy", |p: f64, m: f64| (p * p + m * m).sqrt(), 2);

        self.ctx = ctx;

        let entries = match self.input[section].as_hash() {
            Some(hash) => hash.clone(),
            None => return Ok(self),
        };

        for (a, b) in entries.iter() {
            let (key, value) = match (a, b) {
                (Yaml::String(k), Yaml::Integer(i)) => (Some(k), Some(*i as f64)),
                (Yaml::String(k), Yaml::Real(s)) => (Some(k), s.parse::<f64>().ok()),
                (Yaml::String(k), Yaml::String(s)) => (Some(k), eval_number_with_context(s, &self.ctx).ok()),
                _ => (None, None),
            };

            match (key, value) {
                (Some(k), Some(v)) => {
                    self.ctx.set_value(k.clone(), Value::from(v))
                        .map_err(|_| {
                            eprintln!("Failed to insert {} = {} from constants block into context.", k, v);
                            InputError::conversion(section, k)
                        })?
                },
                (Some(k), None) => return Err(InputError::conversion(section, k)),
                _ => {},
            }
        }

        Ok(self)
    }

    /// Converts the value at `path`, given as colon-separated keys
    /// like `"control:events"`, to a `T`.
    pub fn read<T, S>(&self, path: S) -> Result<T, InputError>
    where
        T: FromYaml,
        S: AsRef<str>,
    {
        let address: Vec<&str> = path.as_ref().split(':').collect();
        let value = address.iter()
          .try_fold(&self.input, |y, s| {
              if y[*s].is_badvalue() {
                  Err(InputError::location(path.as_ref(), s))
              } else {
                  Ok(&y[*s])
              }
          })?;
        let field = address.last().copied().unwrap_or("");
        T::from_yaml(value.clone(), &self.ctx)
            .map_err(|_| InputError::conversion(path.as_ref(), field))
    }

    /// Like `Config::read`, but falls back to `default` if the key-value
    /// pair is absent. A value that is present but cannot be converted
    /// is still an error.
    pub fn read_or<T, S>(&self, path: S, default: T) -> Result<T, InputError>
    where
        T: FromYaml,
        S: AsRef<str>,
    {
        match self.read(path) {
            Err(e) if e.kind() == InputErrorKind::Location => Ok(default),
            other => other,
        }
    }

    /// Compiles the expression at `path` into a function of the single
    /// free variable `arg`. Any other identifier must already be defined.
    pub fn func<'a, S: AsRef<str> + 'a>(&'a self, path: S, arg: S) -> Result<impl Fn(f64) -> f64 + 'a, InputError> {
        let s: String = self.read(&path)?;

        let tree = build_operator_tree(&s)
            .map_err(|_| InputError::conversion(path.as_ref(), &s))?;

        for var in tree.iter_read_variable_identifiers() {
            if var == arg.as_ref() || self.ctx.iter_variable_names().any(|id| var == id) {
                continue;
            } else {
                return Err(InputError::conversion(path.as_ref(), &s))
            }
        }

        let func = move |x| {
            let name = arg.as_ref().to_owned();
            let mut ctx = self.ctx.clone();
            ctx.set_value(name, Value::from(x))
                .ok()
                .and_then(|_| tree.eval_number_with_context(&ctx).ok())
                .unwrap_or(f64::NAN)
        };

        Ok(func)
    }
}

mod helper {
    macro_rules! context_function {
        ($ctx:expr, $name:literal, $func:expr) => {
            $ctx.set_function(
                $name.to_string(),
                Function::new(|arg| {
                    let x = arg.as_number()?;
                    Ok(Value::Float($func(x)))
                })
            ).map_err(|_| InputError::conversion("context", $name))?
        };
        ($ctx:expr, $name:literal, $func:expr, 2) => {
            $ctx.set_function(
                $name.to_string(),
                Function::new(|arg| {
                    let arg = arg.as_fixed_len_tuple(2)?;
                    let x = arg[0].as_number()?;
                    let y = arg[1].as_number()?;
                    Ok(Value::Float($func(x, y)))
                })
            ).map_err(|_| InputError::conversion("context", $name))?
        };
        ($ctx:expr, $name:literal, $func:expr, 3) => {
            $ctx.set_function(
                $name.to_string(),
                Function::new(|arg| {
                    let arg = arg.as_fixed_len_tuple(3)?;
                    let x = arg[0].as_number()?;
                    let y = arg[1].as_number()?;
                    let z = arg[2].as_number()?;
                    Ok(Value::Float($func(x, y, z)))
                })
            ).map_err(|_| InputError::conversion("context", $name))?
        };
    }

    pub(super) use context_function;
}
