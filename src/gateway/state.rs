use std::sync::Arc;

use crate::registry::RegistryApi;
use crate::search::SearchEngine;

#[derive(Debug)]
pub struct HandlerState<R: RegistryApi + 'static> {
    pub engine: Arc<SearchEngine<R>>,
}

impl<R: RegistryApi + 'static> Clone for HandlerState<R> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<R: RegistryApi + 'static> HandlerState<R> {
    pub fn new(engine: Arc<SearchEngine<R>>) -> Self {
        Self { engine }
    }
}
