use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    // In-app route change; client state survives
    Route(String),
    // Full page load; everything is re-read from storage
    Redirect(String),
}

impl Navigation {
    pub fn target(&self) -> &str {
        match self {
            Navigation::Route(path) | Navigation::Redirect(path) => path,
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
    fn redirect(&self, url: &str);
}

#[derive(Debug, Default)]
pub struct NavigationRecorder {
    history: Mutex<Vec<Navigation>>,
}

impl NavigationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Navigation> {
        match self.history.lock() {
            Ok(history) => history.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<Navigation> {
        self.history().pop()
    }

    fn push(&self, navigation: Navigation) {
        tracing::debug!("Navigation requested: {:?}", navigation);
        match self.history.lock() {
            Ok(mut history) => history.push(navigation),
            Err(poisoned) => poisoned.into_inner().push(navigation),
        }
    }
}

impl Navigator for NavigationRecorder {
    fn navigate(&self, path: &str) {
        self.push(Navigation::Route(path.to_string()));
    }

    fn redirect(&self, url: &str) {
        self.push(Navigation::Redirect(url.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let recorder = NavigationRecorder::new();
        assert_eq!(recorder.last(), None);

        recorder.navigate("/account");
        recorder.redirect("/music-connect/login");

        assert_eq!(
            recorder.history(),
            vec![
                Navigation::Route("/account".into()),
                Navigation::Redirect("/music-connect/login".into()),
            ]
        );
        assert_eq!(recorder.last().unwrap().target(), "/music-connect/login");
    }
}
