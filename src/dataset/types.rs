//! Metadata, instances and the read-only training dataset.

use super::attribute::Attribute;
use crate::error::DatasetFormatError;

/// Attribute declarations plus the position of the class attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    attributes: Vec<Attribute>,
    class_index: usize,
}

impl Metadata {
    /// Creates metadata.
    ///
    /// The class attribute must exist and be categorical with a non-empty
    /// domain; class labels are the category indices.
    pub fn new(attributes: Vec<Attribute>, class_index: usize) -> Result<Self, DatasetFormatError> {
        match attributes.get(class_index) {
            None => Err(DatasetFormatError::new(
                0,
                format!(
                    "class index {class_index} out of range for {} attributes",
                    attributes.len()
                ),
            )),
            Some(Attribute::Categorical { categories, .. }) if !categories.is_empty() => Ok(Self {
                attributes,
                class_index,
            }),
            Some(other) => Err(DatasetFormatError::new(
                0,
                format!("class attribute `{}` must be categorical and non-empty", other.name()),
            )),
        }
    }

    /// All attributes, class attribute included.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attribute at `index`.
    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    /// Number of attributes, class attribute included.
    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Position of the class attribute.
    pub fn class_index(&self) -> usize {
        self.class_index
    }

    /// The class attribute.
    pub fn class_attribute(&self) -> &Attribute {
        &self.attributes[self.class_index]
    }

    /// Number of classes (size of the class domain).
    pub fn number_of_classes(&self) -> usize {
        self.class_attribute().cardinality().unwrap_or(0)
    }

    /// Indices of the non-class attributes.
    pub fn input_indices(&self) -> impl Iterator<Item = usize> + '_ {
        let class_index = self.class_index;
        (0..self.attributes.len()).filter(move |&i| i != class_index)
    }
}

/// One encoded row: a value per attribute, class attribute included.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    values: Vec<f64>,
}

impl Instance {
    /// Wraps already-encoded values.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Encoded value of attribute `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn value(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// All encoded values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the instance has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Immutable training set.
///
/// Besides the rows, the dataset keeps for each class the indices of the
/// instances labelled with it, in dataset order. Coverage scans for a target
/// class only walk that list.
#[derive(Debug, Clone)]
pub struct Dataset {
    metadata: Metadata,
    instances: Vec<Instance>,
    by_class: Vec<Vec<usize>>,
}

impl Dataset {
    /// Builds a dataset, checking every row against the metadata.
    pub fn new(metadata: Metadata, instances: Vec<Instance>) -> Result<Self, DatasetFormatError> {
        let width = metadata.num_attributes();
        let num_classes = metadata.number_of_classes();
        let class_index = metadata.class_index();
        let mut by_class = vec![Vec::new(); num_classes];

        for (row, instance) in instances.iter().enumerate() {
            if instance.len() != width {
                return Err(DatasetFormatError::new(
                    0,
                    format!("instance {row} has {} values, expected {width}", instance.len()),
                ));
            }
            let label = instance.value(class_index);
            if label < 0.0 || label.fract() != 0.0 || label as usize >= num_classes {
                return Err(DatasetFormatError::new(
                    0,
                    format!("instance {row} has invalid class value {label}"),
                ));
            }
            by_class[label as usize].push(row);
        }

        Ok(Self {
            metadata,
            instances,
            by_class,
        })
    }

    /// Dataset metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// All instances in load order.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Instance at `index`.
    pub fn instance(&self, index: usize) -> &Instance {
        &self.instances[index]
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the dataset has no instances.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of classes.
    pub fn number_of_classes(&self) -> usize {
        self.metadata.number_of_classes()
    }

    /// Class label of `instance`.
    pub fn class_of(&self, instance: &Instance) -> usize {
        instance.value(self.metadata.class_index()) as usize
    }

    /// Indices of the instances labelled `class_label`, in dataset order.
    pub fn class_instances(&self, class_label: usize) -> &[usize] {
        self.by_class.get(class_label).map_or(&[], Vec::as_slice)
    }

    /// Most frequent class; ties go to the lowest label.
    pub fn majority_class(&self) -> Option<usize> {
        self.by_class
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, rows)| rows.len())
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(label, _)| label)
    }
}
