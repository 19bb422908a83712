use std::path::Path;
use std::str::FromStr;

use crate::core::stats::StatType;

pub fn path(rawpath: &str) -> Result<(), String> {
    let path = Path::new(&rawpath);
    if !path.exists() {
        Err(format!("{} file doesn't exist or there is no permission to read it", rawpath))
    } else {
        Ok(())
    }
}

pub fn stat(stat: &str) -> Result<(), String> {
    StatType::from_str(stat).map(|_| ()).map_err(|x| x.to_string())
}

pub fn numeric<T>(low: T, upper: T) -> impl Fn(&str) -> Result<(), String>
where
    T: FromStr + std::fmt::Display + std::cmp::PartialOrd + Sized,
{
    move |val: &str| -> Result<(), String> {
        let number = val.parse::<T>().map_err(|_| format!("failed to parse {}", val))?;
        if number < low || number > upper {
            return Err(format!("Value {} is expected to be inside [{}, {}] range", val, low, upper));
        }
        Ok(())
    }
}
