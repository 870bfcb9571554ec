use super::{DomainResource, DomainResourceBase, DomainResourceBuilder};
use crate::binding::{Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, BACKBONE_ELEMENT_BASE, DOMAIN_RESOURCE_BASE};
use crate::types::{
    BackboneElement, BackboneElementBase, BackboneElementBuilder, Canonical, CodeValue,
    CodeableConcept, Coded, Element, ElementBase, ElementBuilder, Extension, FhirString, HashMemo,
    Instant, Reference, SubscriptionNotificationType, SubscriptionStatusCode,
};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_list, accept_opt, walk, Node, Visitable, Visitor};

const SUBSCRIPTION_STATUS: Binding = Binding::new(
    "SubscriptionStatus",
    BindingStrength::Required,
    <SubscriptionStatusCode as CodeValue>::VALUE_SET,
)
.description("The status of a subscription.");

const SUBSCRIPTION_NOTIFICATION_TYPE: Binding = Binding::new(
    "SubscriptionNotificationType",
    BindingStrength::Required,
    <SubscriptionNotificationType as CodeValue>::VALUE_SET,
)
.description("The type of notification represented by the status message.");

const SUBSCRIPTION_ERROR: Binding = Binding::new(
    "SubscriptionError",
    BindingStrength::Example,
    "http://hl7.org/fhir/ValueSet/subscription-error",
)
.description("Codes to represent subscription error details.");

const SUBSCRIPTION_TARGETS: &[&str] = &["Subscription"];

/// The status of a subscription at the time a notification was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionStatus {
    base: DomainResourceBase,
    status: Option<Coded<SubscriptionStatusCode>>,
    type_: Coded<SubscriptionNotificationType>,
    events_since_subscription_start: Option<FhirString>,
    notification_event: Vec<SubscriptionStatusNotificationEvent>,
    subscription: Reference,
    topic: Option<Canonical>,
    error: Vec<CodeableConcept>,
    hash: HashMemo,
}

memoized_hash!(SubscriptionStatus {
    base,
    status,
    type_,
    events_since_subscription_start,
    notification_event,
    subscription,
    topic,
    error,
});

impl SubscriptionStatus {
    pub fn builder() -> SubscriptionStatusBuilder {
        SubscriptionStatusBuilder::default()
    }

    pub fn to_builder(&self) -> SubscriptionStatusBuilder {
        SubscriptionStatusBuilder::from(self.clone())
    }

    pub fn status(&self) -> Option<&Coded<SubscriptionStatusCode>> {
        self.status.as_ref()
    }

    pub fn type_(&self) -> &Coded<SubscriptionNotificationType> {
        &self.type_
    }

    pub fn events_since_subscription_start(&self) -> Option<&FhirString> {
        self.events_since_subscription_start.as_ref()
    }

    pub fn notification_event(&self) -> &[SubscriptionStatusNotificationEvent] {
        &self.notification_event
    }

    pub fn subscription(&self) -> &Reference {
        &self.subscription
    }

    pub fn topic(&self) -> Option<&Canonical> {
        self.topic.as_ref()
    }

    pub fn error(&self) -> &[CodeableConcept] {
        &self.error
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "SubscriptionStatus")?;
        validation::check_primitive(
            ctx,
            self.events_since_subscription_start.as_ref(),
            "SubscriptionStatus.eventsSinceSubscriptionStart",
        )?;
        validation::check_reference_type(
            ctx,
            Some(&self.subscription),
            "SubscriptionStatus.subscription",
            SUBSCRIPTION_TARGETS,
        )?;
        validation::check_primitive(ctx, self.topic.as_ref(), "SubscriptionStatus.topic")?;
        validation::check_concept_bindings(
            ctx,
            &self.error,
            "SubscriptionStatus.error",
            &SUBSCRIPTION_ERROR,
        )?;
        Ok(())
    }
}

impl DomainResource for SubscriptionStatus {
    fn domain_resource_base(&self) -> &DomainResourceBase {
        &self.base
    }

    fn resource_type(&self) -> &'static str {
        "SubscriptionStatus"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl Visitable for SubscriptionStatus {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::SubscriptionStatus(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.status.as_ref(), "status", visitor);
            self.type_.accept("type", None, visitor);
            accept_opt(
                self.events_since_subscription_start.as_ref(),
                "eventsSinceSubscriptionStart",
                visitor,
            );
            accept_list(&self.notification_event, "notificationEvent", visitor);
            self.subscription.accept("subscription", None, visitor);
            accept_opt(self.topic.as_ref(), "topic", visitor);
            accept_list(&self.error, "error", visitor);
        });
    }
}

impl ModelInfo for SubscriptionStatus {
    const TYPE_NAME: &'static str = "SubscriptionStatus";
    const BASE_ELEMENTS: &'static [ElementInfo] = DOMAIN_RESOURCE_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("status").summary().binding(SUBSCRIPTION_STATUS),
        ElementInfo::new("type").required().summary().binding(SUBSCRIPTION_NOTIFICATION_TYPE),
        ElementInfo::new("eventsSinceSubscriptionStart").summary(),
        ElementInfo::new("notificationEvent").repeating(),
        ElementInfo::new("subscription").required().summary().targets(SUBSCRIPTION_TARGETS),
        ElementInfo::new("topic").summary(),
        ElementInfo::new("error").repeating().summary().binding(SUBSCRIPTION_ERROR),
    ];
}

#[derive(Debug, Clone, Default)]
pub struct SubscriptionStatusBuilder {
    base: DomainResourceBase,
    status: Option<Coded<SubscriptionStatusCode>>,
    type_: Option<Coded<SubscriptionNotificationType>>,
    events_since_subscription_start: Option<FhirString>,
    notification_event: Vec<SubscriptionStatusNotificationEvent>,
    subscription: Option<Reference>,
    topic: Option<Canonical>,
    error: Vec<CodeableConcept>,
}

impl SubscriptionStatusBuilder {
    pub fn status(mut self, status: impl Into<Coded<SubscriptionStatusCode>>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn type_(mut self, type_: impl Into<Coded<SubscriptionNotificationType>>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    pub fn events_since_subscription_start(
        mut self,
        events_since_subscription_start: impl Into<FhirString>,
    ) -> Self {
        self.events_since_subscription_start = Some(events_since_subscription_start.into());
        self
    }

    pub fn notification_event(
        mut self,
        notification_event: impl IntoIterator<Item = SubscriptionStatusNotificationEvent>,
    ) -> Self {
        self.notification_event.extend(notification_event);
        self
    }

    pub fn set_notification_event(
        mut self,
        notification_event: impl IntoIterator<Item = SubscriptionStatusNotificationEvent>,
    ) -> Self {
        self.notification_event = notification_event.into_iter().collect();
        self
    }

    pub fn subscription(mut self, subscription: Reference) -> Self {
        self.subscription = Some(subscription);
        self
    }

    pub fn topic(mut self, topic: impl Into<Canonical>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn error(mut self, error: impl IntoIterator<Item = CodeableConcept>) -> Self {
        self.error.extend(error);
        self
    }

    pub fn set_error(mut self, error: impl IntoIterator<Item = CodeableConcept>) -> Self {
        self.error = error.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<SubscriptionStatus> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<SubscriptionStatus> {
        let type_ = validation::require_non_null(self.type_, "SubscriptionStatus.type")?;
        let subscription =
            validation::require_non_null(self.subscription, "SubscriptionStatus.subscription")?;
        let status = SubscriptionStatus {
            base: self.base,
            status: self.status,
            type_,
            events_since_subscription_start: self.events_since_subscription_start,
            notification_event: self.notification_event,
            subscription,
            topic: self.topic,
            error: self.error,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            status.validate(ctx).inspect_err(|err| {
                tracing::debug!(
                    resource_type = "SubscriptionStatus",
                    error = %err,
                    "Build rejected",
                );
            })?;
        }
        Ok(status)
    }
}

impl DomainResourceBuilder for SubscriptionStatusBuilder {
    fn domain_resource_base_mut(&mut self) -> &mut DomainResourceBase {
        &mut self.base
    }
}

impl From<SubscriptionStatus> for SubscriptionStatusBuilder {
    fn from(status: SubscriptionStatus) -> Self {
        Self {
            base: status.base,
            status: status.status,
            type_: Some(status.type_),
            events_since_subscription_start: status.events_since_subscription_start,
            notification_event: status.notification_event,
            subscription: Some(status.subscription),
            topic: status.topic,
            error: status.error,
        }
    }
}

/// Detailed information about events relevant to this notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionStatusNotificationEvent {
    base: BackboneElementBase,
    event_number: FhirString,
    timestamp: Option<Instant>,
    focus: Option<Reference>,
    additional_context: Vec<Reference>,
    hash: HashMemo,
}

memoized_hash!(SubscriptionStatusNotificationEvent {
    base,
    event_number,
    timestamp,
    focus,
    additional_context,
});

impl SubscriptionStatusNotificationEvent {
    pub fn builder() -> SubscriptionStatusNotificationEventBuilder {
        SubscriptionStatusNotificationEventBuilder::default()
    }

    pub fn to_builder(&self) -> SubscriptionStatusNotificationEventBuilder {
        SubscriptionStatusNotificationEventBuilder::from(self.clone())
    }

    /// Sequential number of this event for the subscription, as a string.
    pub fn event_number(&self) -> &FhirString {
        &self.event_number
    }

    pub fn timestamp(&self) -> Option<&Instant> {
        self.timestamp.as_ref()
    }

    pub fn focus(&self) -> Option<&Reference> {
        self.focus.as_ref()
    }

    pub fn additional_context(&self) -> &[Reference] {
        &self.additional_context
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "SubscriptionStatus.notificationEvent")?;
        validation::check_primitive(
            ctx,
            Some(&self.event_number),
            "SubscriptionStatus.notificationEvent.eventNumber",
        )?;
        validation::check_primitive(
            ctx,
            self.timestamp.as_ref(),
            "SubscriptionStatus.notificationEvent.timestamp",
        )?;
        validation::require_value_or_children(self, "SubscriptionStatus.notificationEvent")
    }
}

impl Element for SubscriptionStatusNotificationEvent {
    fn element_base(&self) -> &ElementBase {
        &self.base.element
    }

    fn type_name(&self) -> &'static str {
        "SubscriptionStatus.notificationEvent"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl BackboneElement for SubscriptionStatusNotificationEvent {
    fn modifier_extension(&self) -> &[Extension] {
        &self.base.modifier_extension
    }
}

impl Visitable for SubscriptionStatusNotificationEvent {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::SubscriptionStatusNotificationEvent(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            self.event_number.accept("eventNumber", None, visitor);
            accept_opt(self.timestamp.as_ref(), "timestamp", visitor);
            accept_opt(self.focus.as_ref(), "focus", visitor);
            accept_list(&self.additional_context, "additionalContext", visitor);
        });
    }
}

impl ModelInfo for SubscriptionStatusNotificationEvent {
    const TYPE_NAME: &'static str = "SubscriptionStatus.notificationEvent";
    const BASE_ELEMENTS: &'static [ElementInfo] = BACKBONE_ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("eventNumber").required(),
        ElementInfo::new("timestamp"),
        ElementInfo::new("focus"),
        ElementInfo::new("additionalContext").repeating(),
    ];
}

impl CheckValue for SubscriptionStatusNotificationEvent {}

#[derive(Debug, Clone, Default)]
pub struct SubscriptionStatusNotificationEventBuilder {
    base: BackboneElementBase,
    event_number: Option<FhirString>,
    timestamp: Option<Instant>,
    focus: Option<Reference>,
    additional_context: Vec<Reference>,
}

impl SubscriptionStatusNotificationEventBuilder {
    pub fn event_number(mut self, event_number: impl Into<FhirString>) -> Self {
        self.event_number = Some(event_number.into());
        self
    }

    pub fn timestamp(mut self, timestamp: impl Into<Instant>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn focus(mut self, focus: Reference) -> Self {
        self.focus = Some(focus);
        self
    }

    pub fn additional_context(
        mut self,
        additional_context: impl IntoIterator<Item = Reference>,
    ) -> Self {
        self.additional_context.extend(additional_context);
        self
    }

    pub fn set_additional_context(
        mut self,
        additional_context: impl IntoIterator<Item = Reference>,
    ) -> Self {
        self.additional_context = additional_context.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<SubscriptionStatusNotificationEvent> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(
        self,
        ctx: &mut ValidationContext,
    ) -> Result<SubscriptionStatusNotificationEvent> {
        let event_number = validation::require_non_null(
            self.event_number,
            "SubscriptionStatus.notificationEvent.eventNumber",
        )?;
        let event = SubscriptionStatusNotificationEvent {
            base: self.base,
            event_number,
            timestamp: self.timestamp,
            focus: self.focus,
            additional_context: self.additional_context,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            event.validate(ctx)?;
        }
        Ok(event)
    }
}

impl ElementBuilder for SubscriptionStatusNotificationEventBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base.element
    }
}

impl BackboneElementBuilder for SubscriptionStatusNotificationEventBuilder {
    fn backbone_base_mut(&mut self) -> &mut BackboneElementBase {
        &mut self.base
    }
}

impl From<SubscriptionStatusNotificationEvent> for SubscriptionStatusNotificationEventBuilder {
    fn from(event: SubscriptionStatusNotificationEvent) -> Self {
        Self {
            base: event.base,
            event_number: Some(event.event_number),
            timestamp: event.timestamp,
            focus: event.focus,
            additional_context: event.additional_context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn subscription() -> Reference {
        Reference::builder()
            .reference("https://example.org/fhir/r4b/Subscription/123")
            .build()
            .unwrap()
    }

    #[test]
    fn type_and_subscription_are_required() {
        let err = SubscriptionStatus::builder()
            .subscription(subscription())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "SubscriptionStatus.type"));
        let err = SubscriptionStatus::builder()
            .type_(SubscriptionNotificationType::Heartbeat)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "SubscriptionStatus.subscription"));
    }

    #[test]
    fn event_notification_with_events() {
        let event = SubscriptionStatusNotificationEvent::builder()
            .event_number("2")
            .timestamp(Instant::parse("2020-05-29T11:44:13.188-05:00").unwrap())
            .focus(Reference::builder().reference("Encounter/2").build().unwrap())
            .build()
            .unwrap();
        let status = SubscriptionStatus::builder()
            .status(SubscriptionStatusCode::Active)
            .type_(SubscriptionNotificationType::EventNotification)
            .events_since_subscription_start("2")
            .notification_event([event])
            .subscription(subscription())
            .topic("http://example.org/FHIR/R5/SubscriptionTopic/admission")
            .build()
            .unwrap();
        assert_eq!(
            status.type_().value(),
            Some(SubscriptionNotificationType::EventNotification)
        );
        assert_eq!(
            status.notification_event()[0].event_number().as_str(),
            Some("2")
        );
    }

    #[test]
    fn event_number_is_required() {
        let err = SubscriptionStatusNotificationEvent::builder().build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "SubscriptionStatus.notificationEvent.eventNumber"));
    }

    #[test]
    fn subscription_must_reference_a_subscription() {
        let err = SubscriptionStatus::builder()
            .type_(SubscriptionNotificationType::Handshake)
            .subscription(Reference::builder().reference("Patient/1").build().unwrap())
            .build()
            .unwrap_err();
        assert_eq!(err.element(), Some("SubscriptionStatus.subscription"));
    }
}
