//! Isotropic linear elastic materials for bodies of revolution.

use crate::error::{Error, Result};
use crate::types::ConstitutiveMatrix;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Standard gravitational acceleration (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Material properties for axisymmetric static analysis.
///
/// Deserializes from either a property object or a `mat_E_nu_rho` label
/// string, and is validated on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MaterialInput")]
pub struct Material {
    /// Young's modulus E.
    pub youngs_modulus: f64,
    /// Poisson's ratio ν, in (-1, 0.5).
    pub poissons_ratio: f64,
    /// Mass density ρ; zero disables the self-weight load.
    pub density: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaterialInput {
    Label(String),
    Properties {
        youngs_modulus: f64,
        poissons_ratio: f64,
        #[serde(default)]
        density: f64,
    },
}

impl TryFrom<MaterialInput> for Material {
    type Error = Error;

    fn try_from(input: MaterialInput) -> Result<Self> {
        match input {
            MaterialInput::Label(label) => Self::from_label(&label),
            MaterialInput::Properties {
                youngs_modulus,
                poissons_ratio,
                density,
            } => Self::new(youngs_modulus, poissons_ratio, density),
        }
    }
}

impl Material {
    /// Create a validated material.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMaterial`] if E ≤ 0, ν ∉ (-1, 0.5) or ρ < 0.
    pub fn new(youngs_modulus: f64, poissons_ratio: f64, density: f64) -> Result<Self> {
        let material = Self {
            youngs_modulus,
            poissons_ratio,
            density,
        };
        material.validate()?;
        Ok(material)
    }

    /// Check the physical admissibility of the properties.
    pub fn validate(&self) -> Result<()> {
        if !(self.youngs_modulus > 0.0) {
            return Err(Error::InvalidMaterial(format!(
                "Young's modulus must be positive, got {}",
                self.youngs_modulus
            )));
        }
        if !(self.poissons_ratio > -1.0 && self.poissons_ratio < 0.5) {
            return Err(Error::InvalidMaterial(format!(
                "Poisson's ratio must be in range (-1, 0.5), got {}",
                self.poissons_ratio
            )));
        }
        if !(self.density >= 0.0) {
            return Err(Error::InvalidMaterial(format!(
                "density must be non-negative, got {}",
                self.density
            )));
        }
        Ok(())
    }

    /// Parse a physical-group style material label `mat_<E>_<nu>_<rho>`.
    ///
    /// ```
    /// use axifem_core::Material;
    ///
    /// let m = Material::from_label("mat_2e11_0.3_7850").unwrap();
    /// assert_eq!(m.density, 7850.0);
    /// ```
    pub fn from_label(label: &str) -> Result<Self> {
        let fields: Vec<&str> = label.split('_').collect();
        if fields.len() != 4 || fields[0] != "mat" {
            return Err(Error::InvalidMaterial(format!(
                "expected a label of the form mat_E_nu_rho, got '{}'",
                label
            )));
        }
        let parse = |s: &str| {
            s.parse::<f64>().map_err(|_| {
                Error::InvalidMaterial(format!("'{}' in label '{}' is not a number", s, label))
            })
        };
        Self::new(parse(fields[1])?, parse(fields[2])?, parse(fields[3])?)
    }

    /// Axisymmetric constitutive matrix D.
    ///
    /// ```text
    /// [σ_r ]                       [1-ν  ν    ν    0        ] [ε_r ]
    /// [σ_z ] = E/((1+ν)(1-2ν)) ·   [ν    1-ν  ν    0        ] [ε_z ]
    /// [σ_θ ]                       [ν    ν    1-ν  0        ] [ε_θ ]
    /// [τ_rz]                       [0    0    0    (1-2ν)/2 ] [γ_rz]
    /// ```
    pub fn constitutive_axisymmetric(&self) -> ConstitutiveMatrix {
        let e = self.youngs_modulus;
        let nu = self.poissons_ratio;

        let factor = e / ((1.0 + nu) * (1.0 - 2.0 * nu));
        let c11 = factor * (1.0 - nu);
        let c12 = factor * nu;
        let c44 = factor * (1.0 - 2.0 * nu) / 2.0;

        ConstitutiveMatrix::new(
            c11, c12, c12, 0.0,
            c12, c11, c12, 0.0,
            c12, c12, c11, 0.0,
            0.0, 0.0, 0.0, c44,
        )
    }

    /// Self-weight body force per unit volume `[0, -ρg]`, acting along -z.
    pub fn body_force(&self, gravity: f64) -> Vector2<f64> {
        Vector2::new(0.0, -self.density * gravity)
    }

    /// Structural steel (E = 200 GPa, ν = 0.3, ρ = 7850 kg/m³).
    pub fn steel() -> Self {
        Self {
            youngs_modulus: 200e9,
            poissons_ratio: 0.3,
            density: 7850.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_material_creation() {
        let mat = Material::new(200e9, 0.3, 0.0).unwrap();
        assert_relative_eq!(mat.youngs_modulus, 200e9);
        assert_relative_eq!(mat.poissons_ratio, 0.3);
    }

    #[test]
    fn test_invalid_properties() {
        assert!(Material::new(-100e9, 0.3, 0.0).is_err());
        assert!(Material::new(0.0, 0.3, 0.0).is_err());
        assert!(Material::new(200e9, 0.5, 0.0).is_err());
        assert!(Material::new(200e9, -1.0, 0.0).is_err());
        assert!(Material::new(200e9, 0.3, -1.0).is_err());
        assert!(Material::new(f64::NAN, 0.3, 0.0).is_err());
    }

    #[test]
    fn test_from_label() {
        let mat = Material::from_label("mat_1e6_0.25_2000").unwrap();
        assert_relative_eq!(mat.youngs_modulus, 1e6);
        assert_relative_eq!(mat.poissons_ratio, 0.25);
        assert_relative_eq!(mat.density, 2000.0);

        assert!(matches!(
            Material::from_label("steel_1_2_3"),
            Err(Error::InvalidMaterial(_))
        ));
        assert!(Material::from_label("mat_x_0.3_0").is_err());
        assert!(Material::from_label("mat_1e6_0.3").is_err());
    }

    #[test]
    fn test_deserialize_label_or_properties() {
        let mats: Vec<Material> = serde_json::from_str(
            r#"["mat_2e11_0.3_7850", {"youngs_modulus": 1e6, "poissons_ratio": 0.25}]"#,
        )
        .unwrap();
        assert_eq!(mats[0], Material::steel());
        assert_eq!(mats[1], Material::new(1e6, 0.25, 0.0).unwrap());

        let err = serde_json::from_str::<Material>(r#""mat_1e6_0.7_0""#).unwrap_err();
        assert!(err.to_string().contains("Poisson"), "{}", err);
        assert!(serde_json::from_str::<Material>(
            r#"{"youngs_modulus": -1.0, "poissons_ratio": 0.3}"#
        )
        .is_err());
    }

    #[test]
    fn test_axisymmetric_constitutive_values() {
        let mat = Material::steel();
        let d = mat.constitutive_axisymmetric();

        let factor = 200e9 / (1.3 * 0.4);
        assert_relative_eq!(d[(0, 0)], factor * 0.7, max_relative = 1e-12);
        assert_relative_eq!(d[(2, 2)], factor * 0.7, max_relative = 1e-12);
        assert_relative_eq!(d[(0, 1)], factor * 0.3, max_relative = 1e-12);
        assert_relative_eq!(d[(1, 2)], factor * 0.3, max_relative = 1e-12);
        assert_relative_eq!(d[(3, 3)], factor * 0.2, max_relative = 1e-12);
        assert_eq!(d[(0, 3)], 0.0);

        for i in 0..4 {
            for j in 0..4 {
                assert_relative_eq!(d[(i, j)], d[(j, i)]);
            }
        }
    }

    #[test]
    fn test_body_force_points_down() {
        let mat = Material::new(1e6, 0.3, 2000.0).unwrap();
        let b = mat.body_force(STANDARD_GRAVITY);
        assert_eq!(b[0], 0.0);
        assert_relative_eq!(b[1], -2000.0 * 9.81);
    }
}
