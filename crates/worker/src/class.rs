/// Execution classes used for worker observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Latency-sensitive work that directly affects interactive UX (host event dispatch).
	Interactive,
	/// Background work that can be delayed or superseded (rescans).
	Background,
}

impl TaskClass {
	/// Stable name used as a tracing field.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
		}
	}
}
