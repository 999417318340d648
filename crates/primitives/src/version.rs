use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced when parsing a host version string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostVersionError {
	/// The string had fewer than two dot-separated components.
	#[error("host version `{0}` is missing a minor component")]
	MissingMinor(String),
	/// A component was not a non-negative integer.
	#[error("host version `{input}` has a non-numeric component `{component}`")]
	InvalidComponent {
		/// The full input.
		input: String,
		/// The offending component.
		component: String,
	},
}

/// Version of the editor host, used to gate features on a minimum release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostVersion {
	/// Major version.
	pub major: u32,
	/// Minor version.
	pub minor: u32,
	/// Patch version, `0` when absent.
	pub patch: u32,
}

impl HostVersion {
	/// Creates a version from its components.
	pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
		Self { major, minor, patch }
	}

	/// Returns true if this version is at or above `floor`, comparing major.minor only.
	pub fn satisfies(&self, floor: HostVersion) -> bool {
		(self.major, self.minor) >= (floor.major, floor.minor)
	}
}

impl fmt::Display for HostVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
	}
}

impl FromStr for HostVersion {
	type Err = HostVersionError;

	/// Accepts `major.minor[.patch][-suffix]`; suffixes such as `-insider` are ignored.
	fn from_str(input: &str) -> Result<Self, Self::Err> {
		let core = input.trim().split(['-', '+']).next().unwrap_or_default();
		let mut parts = core.split('.');

		let parse = |component: &str| {
			component.parse::<u32>().map_err(|_| HostVersionError::InvalidComponent {
				input: input.to_string(),
				component: component.to_string(),
			})
		};

		let major = parse(parts.next().unwrap_or_default())?;
		let minor = match parts.next() {
			Some(minor) => parse(minor)?,
			None => return Err(HostVersionError::MissingMinor(input.to_string())),
		};
		let patch = match parts.next() {
			Some(patch) => parse(patch)?,
			None => 0,
		};

		Ok(Self { major, minor, patch })
	}
}
