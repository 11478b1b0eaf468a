use std::path::{self, Path};

pub trait BestEffortPathExt {
    /// Canonical form if the path exists, otherwise its absolute form.
    fn best_effort_path_display(&self) -> String;
}

impl<P: AsRef<Path> + ?Sized> BestEffortPathExt for P {
    fn best_effort_path_display(&self) -> String {
        let raw = self.as_ref();
        raw.canonicalize()
            .or_else(|_| path::absolute(raw))
            .unwrap_or_else(|_| raw.to_path_buf())
            .display()
            .to_string()
    }
}
