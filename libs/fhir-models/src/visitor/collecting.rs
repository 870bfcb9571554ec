use super::{Node, Visitor};

/// Gathers owned values from every node accepted by `select`.
///
/// ```
/// use ferrum_models::prelude::*;
/// use ferrum_models::visitor::{CollectingVisitor, Node};
///
/// let medication = Medication::builder()
///     .manufacturer(Reference::builder().reference("Organization/acme").build()?)
///     .build()?;
///
/// let mut collector = CollectingVisitor::new(|node| match node {
///     Node::Reference(reference) => reference.reference_value().map(str::to_string),
///     _ => None,
/// });
/// medication.accept_visitor(&mut collector);
/// assert_eq!(collector.into_results(), vec!["Organization/acme".to_string()]);
/// # Ok::<(), ferrum_models::Error>(())
/// ```
pub struct CollectingVisitor<T, F>
where
    F: FnMut(Node<'_>) -> Option<T>,
{
    select: F,
    results: Vec<T>,
}

impl<T, F> CollectingVisitor<T, F>
where
    F: FnMut(Node<'_>) -> Option<T>,
{
    pub fn new(select: F) -> Self {
        Self {
            select,
            results: Vec::new(),
        }
    }

    pub fn results(&self) -> &[T] {
        &self.results
    }

    pub fn into_results(self) -> Vec<T> {
        self.results
    }
}

impl<T, F> Visitor for CollectingVisitor<T, F>
where
    F: FnMut(Node<'_>) -> Option<T>,
{
    fn visit_start(&mut self, _name: &str, _index: Option<usize>, node: Node<'_>) {
        if let Some(item) = (self.select)(node) {
            self.results.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn collects_nested_codings() {
        let concept = CodeableConcept::builder()
            .coding([
                Coding::builder().code("a").build().unwrap(),
                Coding::builder().code("b").build().unwrap(),
            ])
            .text("two codes")
            .build()
            .unwrap();

        let mut collector = CollectingVisitor::new(|node| match node {
            Node::Coding(coding) => coding.code_value().map(str::to_string),
            _ => None,
        });
        concept.accept("code", None, &mut collector);
        assert_eq!(collector.results(), &["a".to_string(), "b".to_string()]);
    }
}
