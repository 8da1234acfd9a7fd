use crate::health::ExitCode;

pub trait CallableTrait {
    fn call(&self) -> Result<ExitCode, Box<dyn std::error::Error>>;
}
