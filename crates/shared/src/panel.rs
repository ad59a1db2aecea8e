use chrono::NaiveDate;

use crate::error::{FetchError, PanelError, ValidationError};
use crate::registry::{self, TopicId};
use crate::schema::{ForecastKind, ForecastParams};
use crate::wire::{ForecastRequest, ForecastResult, ResultValue};

/// Identity of one panel instance. Reopening a topic yields a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastStatus {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// A validated request ready to be sent. The response must be handed back
/// with the same `panel` and `seq`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTicket {
    pub panel: PanelId,
    pub seq: u64,
    pub request: ForecastRequest,
}

/// What became of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Applied,
    /// Superseded by a newer request, or already answered.
    Stale,
    /// The panel it was issued for is no longer open.
    PanelClosed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPanel {
    id: PanelId,
    topic: TopicId,
    params: ForecastParams,
    latest_seq: u64,
    status: ForecastStatus,
    result: Option<ForecastResult>,
    selected_key: Option<String>,
    stale: bool,
    validation_error: Option<ValidationError>,
    failure: Option<FetchError>,
}

impl ForecastPanel {
    pub fn new(id: PanelId, topic: TopicId, default_temperature: f64) -> Self {
        let kind = registry::topic(topic).forecast;
        ForecastPanel {
            id,
            topic,
            params: ForecastParams::for_kind(kind, default_temperature),
            latest_seq: 0,
            status: ForecastStatus::Idle,
            result: None,
            selected_key: None,
            stale: false,
            validation_error: None,
            failure: None,
        }
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn topic(&self) -> TopicId {
        self.topic
    }

    pub fn kind(&self) -> ForecastKind {
        self.params.kind()
    }

    pub fn params(&self) -> &ForecastParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ForecastParams {
        &mut self.params
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    pub fn status(&self) -> ForecastStatus {
        self.status
    }

    pub fn result(&self) -> Option<&ForecastResult> {
        self.result.as_ref()
    }

    pub fn selected_key(&self) -> Option<&str> {
        self.selected_key.as_deref()
    }

    pub fn selected_value(&self) -> Option<&ResultValue> {
        let key = self.selected_key.as_deref()?;
        self.result.as_ref()?.get(key)
    }

    /// The shown result predates a failed request.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.validation_error.as_ref()
    }

    pub fn failure(&self) -> Option<&FetchError> {
        self.failure.as_ref()
    }

    /// Validate the current parameters and issue the next sequence number.
    ///
    /// On a validation error nothing is issued and the rest of the panel state
    /// (including any request still pending) is left as it was.
    pub fn submit(&mut self, today: NaiveDate) -> Result<ForecastTicket, ValidationError> {
        let request = match self.params.validate(today) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(panel = self.id.0, topic = %self.topic, error = %e, "forecast parameters rejected");
                self.validation_error = Some(e.clone());
                return Err(e);
            }
        };
        self.validation_error = None;
        self.failure = None;
        self.latest_seq += 1;
        self.status = ForecastStatus::Pending;
        tracing::debug!(panel = self.id.0, seq = self.latest_seq, endpoint = request.endpoint(), "forecast issued");
        Ok(ForecastTicket {
            panel: self.id,
            seq: self.latest_seq,
            request,
        })
    }

    /// Resubmit the current parameters, typically after a failure.
    pub fn retry(&mut self, today: NaiveDate) -> Result<ForecastTicket, ValidationError> {
        self.submit(today)
    }

    pub fn apply_response(&mut self, seq: u64, outcome: Result<ForecastResult, FetchError>) -> Disposition {
        if seq != self.latest_seq || self.status != ForecastStatus::Pending {
            tracing::debug!(panel = self.id.0, seq, latest = self.latest_seq, "discarding stale forecast response");
            return Disposition::Stale;
        }
        match outcome {
            Ok(result) => {
                self.selected_key = Some(result.first_key().to_string());
                self.result = Some(result);
                self.stale = false;
                self.status = ForecastStatus::Succeeded;
            }
            Err(e) => {
                tracing::warn!(panel = self.id.0, seq, error = %e, "forecast failed");
                self.stale = self.result.is_some();
                self.failure = Some(e);
                self.status = ForecastStatus::Failed;
            }
        }
        Disposition::Applied
    }

    pub fn select_result_key(&mut self, key: &str) -> Result<(), PanelError> {
        let result = self.result.as_ref().ok_or(PanelError::NoResult)?;
        if !result.contains_key(key) {
            return Err(PanelError::UnknownResultKey(key.to_string()));
        }
        self.selected_key = Some(key.to_string());
        Ok(())
    }
}
