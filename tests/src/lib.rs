#[cfg(test)]
mod discovery;
#[cfg(test)]
mod registry;
#[cfg(test)]
mod utils;
