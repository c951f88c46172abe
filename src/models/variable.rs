use serde::{Deserialize, Serialize};

/// Target variables extracted from INMET hourly station files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    TotalPrecipitation,
    AirTemperature,
}

impl Variable {
    pub const ALL: [Variable; 2] = [Variable::TotalPrecipitation, Variable::AirTemperature];

    /// Directory and report name used for this variable's outputs
    pub fn dir_name(&self) -> &'static str {
        match self {
            Variable::TotalPrecipitation => "total_precipitation",
            Variable::AirTemperature => "2m_air_temperature",
        }
    }

    /// Canonical fragment that identifies the variable's column in any year's header
    pub fn header_fragment(&self) -> &'static str {
        match self {
            Variable::TotalPrecipitation => "precipitacao total",
            Variable::AirTemperature => "bulbo seco",
        }
    }

    /// Canonical keys seen for this column across yearly file layouts
    pub fn header_aliases(&self) -> &'static [&'static str] {
        match self {
            Variable::TotalPrecipitation => &["precipitacao total, horario(mm)"],
            Variable::AirTemperature => &[
                "temperatura do ar - bulbo seco, horaria(°c)",
                "temperatura do ar - bulbo seco, horaria(c)",
            ],
        }
    }

    /// Name used in configuration files and environment variables
    pub fn config_name(&self) -> &'static str {
        match self {
            Variable::TotalPrecipitation => "total_precipitation",
            Variable::AirTemperature => "air_temperature",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Variable::TotalPrecipitation => "Total Precipitation",
            Variable::AirTemperature => "2m Air Temperature",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            Variable::TotalPrecipitation => "mm",
            Variable::AirTemperature => "°C",
        }
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_contain_fragment() {
        for variable in Variable::ALL {
            for alias in variable.header_aliases() {
                assert!(alias.contains(variable.header_fragment()));
            }
        }
    }

    #[test]
    fn test_variable_units() {
        assert_eq!(Variable::TotalPrecipitation.units(), "mm");
        assert_eq!(Variable::AirTemperature.units(), "°C");
        assert_eq!(Variable::AirTemperature.to_string(), "2m_air_temperature");
    }
}
