use std::path::Path;

use super::Product;

use crate::{errors::KeoDataErr, series::TimeSeries};

#[cfg(feature = "ncdata")]
pub(super) fn read_netcdf(path: &Path, product: Product) -> Result<TimeSeries, KeoDataErr> {
    use log::warn;

    use super::CfUnits;

    let file = netcdf::open(path)?;

    let missing =
        |name: &str| KeoDataErr::MissingVariable(format!("{} in {}", name, path.display()));

    let time_var = file
        .variable(product.time_variable())
        .ok_or_else(|| missing(product.time_variable()))?;
    let value_var = file
        .variable(product.value_variable())
        .ok_or_else(|| missing(product.value_variable()))?;

    let units: CfUnits = match time_var.attribute("units").map(|a| a.value()).transpose()? {
        Some(netcdf::AttributeValue::Str(units)) => units.parse()?,
        _ => return Err(missing("units attribute of time")),
    };

    let raw_times: Vec<f64> = time_var.get_values::<f64, _>(..)?;
    let raw_values: Vec<f64> = value_var.get_values::<f64, _>(..)?;
    let fill = value_var
        .attribute("_FillValue")
        .and_then(|a| a.value().ok())
        .and_then(attribute_number);

    let values: Vec<f64> = match product.column() {
        Some(col) => {
            let stride = value_var
                .dimensions()
                .get(1)
                .map(|dim| dim.len())
                .unwrap_or(1);
            if col >= stride {
                return Err(missing(&format!("column {} of {}", col, product.value_variable())));
            }
            raw_values.chunks(stride).map(|row| row[col]).collect()
        }
        None => raw_values,
    };

    if values.len() != raw_times.len() {
        warn!(
            "{} has {} times but {} values, using the shorter",
            path.display(),
            raw_times.len(),
            values.len()
        );
    }

    let samples = raw_times
        .into_iter()
        .zip(values)
        .filter(|&(_, v)| !is_fill(v, fill))
        .filter_map(|(t, v)| units.to_datetime(t).map(|time| (time, v)));

    Ok(TimeSeries::new(product.series_name(), samples))
}

#[cfg(feature = "ncdata")]
fn attribute_number(value: netcdf::AttributeValue) -> Option<f64> {
    use netcdf::AttributeValue as AV;

    match value {
        AV::Double(v) => Some(v),
        AV::Float(v) => Some(f64::from(v)),
        AV::Int(v) => Some(f64::from(v)),
        AV::Short(v) => Some(f64::from(v)),
        AV::Longlong(v) => Some(v as f64),
        AV::Doubles(v) => v.first().copied(),
        AV::Floats(v) => v.first().map(|&x| f64::from(x)),
        _ => None,
    }
}

/// Is `value` the fill value, or the default netCDF fill for floating point data?
#[cfg_attr(not(feature = "ncdata"), allow(dead_code))]
fn is_fill(value: f64, fill: Option<f64>) -> bool {
    const DEFAULT_FILL: f64 = 9.969_209_968_386_869e36;

    if value.abs() >= DEFAULT_FILL * 0.999_999 {
        return true;
    }

    match fill {
        Some(fill) if fill.is_nan() => value.is_nan(),
        Some(fill) => (value - fill).abs() <= fill.abs() * 1.0e-6,
        None => false,
    }
}

#[cfg(not(feature = "ncdata"))]
pub(super) fn read_netcdf(_path: &Path, _product: Product) -> Result<TimeSeries, KeoDataErr> {
    Err(KeoDataErr::FeatureDisabled("ncdata"))
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_fill_values() {
        assert!(is_fill(-99999.0, Some(-99999.0)));
        assert!(is_fill(9.969_209_968_386_869e36, None));
        assert!(!is_fill(-5.0, Some(-99999.0)));
        assert!(!is_fill(0.0, None));
        assert!(is_fill(f64::NAN, Some(f64::NAN)));
    }
}
