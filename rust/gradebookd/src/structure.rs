use crate::error::{GradebookError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Allowed drift between a category's declared total and the sum of its
/// component percentages.
pub const SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    ClassParticipation,
    Exam,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::ClassParticipation, Category::Exam];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "classParticipation" => Some(Self::ClassParticipation),
            "exam" => Some(Self::Exam),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ClassParticipation => "Class Participation",
            Self::Exam => "Exam",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeComponent {
    pub id: String,
    pub name: String,
    pub percentage: f64,
}

impl GradeComponent {
    pub fn new(id: &str, name: &str, percentage: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryConfig {
    pub total: f64,
    #[serde(default)]
    pub components: Vec<GradeComponent>,
}

impl CategoryConfig {
    pub fn component_sum(&self) -> f64 {
        self.components.iter().map(|c| c.percentage).sum()
    }

    fn component_mut(&mut self, component_id: &str) -> Result<&mut GradeComponent> {
        self.components
            .iter_mut()
            .find(|c| c.id == component_id)
            .ok_or_else(|| GradebookError::NotFound {
                entity: "component",
                id: component_id.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeStructure {
    pub class_participation: CategoryConfig,
    pub exam: CategoryConfig,
}

impl Default for GradeStructure {
    fn default() -> Self {
        Self {
            class_participation: CategoryConfig {
                total: 70.0,
                components: vec![
                    GradeComponent::new("1", "Quizzes", 25.0),
                    GradeComponent::new("2", "Activities", 25.0),
                    GradeComponent::new("3", "Attendance", 20.0),
                ],
            },
            exam: CategoryConfig {
                total: 30.0,
                components: vec![
                    GradeComponent::new("1", "Midterm Exam", 15.0),
                    GradeComponent::new("2", "Final Exam", 15.0),
                ],
            },
        }
    }
}

impl GradeStructure {
    pub fn category(&self, category: Category) -> &CategoryConfig {
        match category {
            Category::ClassParticipation => &self.class_participation,
            Category::Exam => &self.exam,
        }
    }

    pub fn category_mut(&mut self, category: Category) -> &mut CategoryConfig {
        match category {
            Category::ClassParticipation => &mut self.class_participation,
            Category::Exam => &mut self.exam,
        }
    }
}

/// Save-time checks. Reports the first violation: class participation sum,
/// then exam sum, then the combined total.
pub fn validate_structure(structure: &GradeStructure) -> Result<()> {
    for category in Category::ALL {
        let cfg = structure.category(category);
        if (cfg.component_sum() - cfg.total).abs() > SUM_TOLERANCE {
            return Err(GradebookError::Validation(format!(
                "{} components must sum to {}%",
                category.label(),
                cfg.total
            )));
        }
    }
    if structure.class_participation.total + structure.exam.total != 100.0 {
        return Err(GradebookError::Validation(
            "Total percentage must equal 100%".to_string(),
        ));
    }
    Ok(())
}

pub fn add_component(structure: &mut GradeStructure, category: Category) -> GradeComponent {
    let component = GradeComponent {
        id: Uuid::new_v4().to_string(),
        name: String::new(),
        percentage: 0.0,
    };
    structure
        .category_mut(category)
        .components
        .push(component.clone());
    component
}

pub fn remove_component(
    structure: &mut GradeStructure,
    category: Category,
    component_id: &str,
) -> Result<GradeComponent> {
    let components = &mut structure.category_mut(category).components;
    let Some(pos) = components.iter().position(|c| c.id == component_id) else {
        return Err(GradebookError::NotFound {
            entity: "component",
            id: component_id.to_string(),
        });
    };
    Ok(components.remove(pos))
}

pub fn update_component(
    structure: &mut GradeStructure,
    category: Category,
    component_id: &str,
    name: Option<&str>,
    percentage: Option<f64>,
) -> Result<()> {
    let component = structure.category_mut(category).component_mut(component_id)?;
    if let Some(name) = name {
        component.name = name.to_string();
    }
    if let Some(percentage) = percentage {
        component.percentage = percentage;
    }
    Ok(())
}

pub fn update_total(structure: &mut GradeStructure, category: Category, total: f64) {
    structure.category_mut(category).total = total;
}
