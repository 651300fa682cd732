/// Return type of loops that only ever exit with an error. Stands in for the unstable `!`.
#[derive(Debug)]
pub enum Never {}
