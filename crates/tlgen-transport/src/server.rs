//! Inbound RPC dispatch

use crate::evaluator::Evaluator;
use crate::value::Record;
use crate::wire::{CodecError, WireReader};
use std::collections::HashMap;
use std::sync::Arc;
use tlgen_codegen::ir::{CodecKind, DispatchCase, ServerDispatch};
use tlgen_core::Magic;

/// A fetched request, ready for its handler
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub magic: Magic,
    pub function: String,
    pub handler: String,
    pub args: Record,
}

/// Receives every successfully fetched request
pub trait QuerySink: Send + Sync {
    fn accept(&self, request: &RpcRequest);
}

impl<F> QuerySink for F
where
    F: Fn(&RpcRequest) + Send + Sync,
{
    fn accept(&self, request: &RpcRequest) {
        self(request)
    }
}

/// Switch over the magics of bound server functions.
#[derive(Debug, Clone)]
pub struct ServerDispatcher {
    cases: HashMap<Magic, DispatchCase>,
    evaluator: Arc<Evaluator>,
}

impl ServerDispatcher {
    pub fn new(dispatch: &ServerDispatch, evaluator: Arc<Evaluator>) -> Self {
        Self {
            cases: dispatch
                .cases
                .iter()
                .map(|c| (c.magic, c.clone()))
                .collect(),
            evaluator,
        }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Read a function magic and fetch the matching request.
    ///
    /// An unknown magic is logged and answered with `None`; only malformed
    /// input of a known function is an error.
    pub fn fetch_request(
        &self,
        r: &mut WireReader<'_>,
        sink: &dyn QuerySink,
    ) -> Result<Option<RpcRequest>, CodecError> {
        let magic = r.read_u32()?;
        let Some(case) = self.cases.get(&magic) else {
            tracing::warn!(
                "Unexpected function magic on fetching request in rpc server: 0x{magic:08x}"
            );
            return Ok(None);
        };

        let args = self
            .evaluator
            .fetch_combinator_body(r, CodecKind::Function, &case.function)?;
        tracing::debug!(function = %case.function, handler = %case.handler, "fetched request");
        let request = RpcRequest {
            magic,
            function: case.function.clone(),
            handler: case.handler.clone(),
            args,
        };
        sink.accept(&request);
        Ok(Some(request))
    }
}
