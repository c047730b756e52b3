pub mod forms;
pub mod serve;
pub mod version;

pub use forms::Forms;
pub use serve::Serve;
pub use version::Version;
