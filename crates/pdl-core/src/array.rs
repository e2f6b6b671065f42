//! Homogeneous parameter sequences.

use crate::{
    error::{ParameterError, Result},
    meta::Meta,
    parameter::Parameter,
};

/// A sequence of parameters sharing one element schema.
///
/// New elements are clones of the prototype, which holds the default value
/// of the element schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayParameter {
    prototype: Box<Parameter>,
    elements: Vec<Parameter>,
    meta: Meta,
}

impl ArrayParameter {
    /// Creates an empty array whose elements default to `prototype`.
    pub fn new(prototype: impl Into<Parameter>, meta: Meta) -> Self {
        Self {
            prototype: Box::new(prototype.into()),
            elements: Vec::new(),
            meta,
        }
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn prototype(&self) -> &Parameter {
        &self.prototype
    }

    /// Returns a new, detached element initialised from the prototype.
    pub fn make_element(&self) -> Parameter {
        (*self.prototype).clone()
    }

    pub fn push(&mut self, element: impl Into<Parameter>) {
        self.elements.push(element.into());
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Resizes to `len` elements, appending prototype clones or truncating.
    pub fn resize(&mut self, len: usize) {
        let prototype = &self.prototype;
        self.elements.resize_with(len, || (**prototype).clone());
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Parameter> {
        self.elements.iter_mut()
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::IndexOutOfRange`] if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<&Parameter> {
        let len = self.elements.len();
        self.elements
            .get(index)
            .ok_or_else(|| self.out_of_range(index, len))
    }

    /// Mutable counterpart of [`get`](Self::get).
    pub fn get_mut(&mut self, index: usize) -> Result<&mut Parameter> {
        let len = self.elements.len();
        let err = self.out_of_range(index, len);
        self.elements.get_mut(index).ok_or(err)
    }

    fn out_of_range(&self, index: usize, len: usize) -> ParameterError {
        ParameterError::IndexOutOfRange {
            name: self.meta.description().to_string(),
            index,
            len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::DoubleParameter;

    fn values(array: &ArrayParameter) -> Vec<f64> {
        array
            .iter()
            .map(|e| *e.downcast_ref::<DoubleParameter>().unwrap().value())
            .collect()
    }

    #[test]
    fn test_resize_uses_prototype() {
        let mut array = ArrayParameter::new(DoubleParameter::new(0.5, Meta::default()), Meta::default());
        array.resize(3);
        assert_eq!(values(&array), vec![0.5, 0.5, 0.5]);

        array
            .get_mut(1)
            .unwrap()
            .downcast_mut::<DoubleParameter>()
            .unwrap()
            .set(2.0);
        array.resize(2);
        assert_eq!(values(&array), vec![0.5, 2.0]);
    }

    #[test]
    fn test_push_and_clear() {
        let mut array = ArrayParameter::new(DoubleParameter::new(0.0, Meta::default()), Meta::default());
        let mut element = array.make_element();
        element.downcast_mut::<DoubleParameter>().unwrap().set(4.0);
        array.push(element);
        assert_eq!(values(&array), vec![4.0]);

        array.clear();
        assert!(array.is_empty());
    }

    #[test]
    fn test_index_out_of_range() {
        let array = ArrayParameter::new(DoubleParameter::new(0.0, Meta::default()), Meta::new("pts"));
        let err = array.get(0).unwrap_err();
        assert_eq!(
            err,
            ParameterError::IndexOutOfRange {
                name: "pts".to_string(),
                index: 0,
                len: 0,
            }
        );
    }
}
