use super::EpisodeSummary;

pub type Hook = Box<dyn FnMut(usize, &EpisodeSummary)>;

pub struct Reporter {
    hooks: Vec<(usize, Hook)>,
}

impl Reporter {
    pub fn new() -> Self {
        Reporter { hooks: vec![] }
    }

    /// A hook registered with `every == 0` never fires
    pub fn register<F>(&mut self, every: usize, hook: F)
    where
        F: FnMut(usize, &EpisodeSummary) + 'static,
    {
        self.hooks.push((every, Box::new(hook)));
    }

    pub fn report(&mut self, i: usize, summary: &EpisodeSummary) {
        self.hooks
            .iter_mut()
            .filter(|(every, _)| *every != 0 && i % *every == 0)
            .for_each(|(_, hook)| hook(i, summary));
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Reporter::new()
    }
}
