use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One checklist per `(company_id, employee_id)`; tasks are stored inline and
/// the whole document is rewritten on every mutation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "onboarding_checklist")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub company_id: Uuid,
    pub employee_id: String,
    #[sea_orm(column_type = "Json")]
    pub tasks: ChecklistTasks,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistTask {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

impl ChecklistTask {
    pub fn new(name: impl Into<String>, completed: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            completed,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ChecklistTasks(pub Vec<ChecklistTask>);

impl ChecklistTasks {
    pub fn find_mut(&mut self, task_id: Uuid) -> Option<&mut ChecklistTask> {
        self.0.iter_mut().find(|task| task.id == task_id)
    }

    pub fn push(&mut self, task: ChecklistTask) {
        self.0.push(task);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("no relations")
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_serialize_as_plain_array() {
        let task = ChecklistTask::new("Sign contract", false);
        let tasks = ChecklistTasks(vec![task.clone()]);
        let value = serde_json::to_value(&tasks).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["name"], "Sign contract");
        assert_eq!(value[0]["id"], task.id.to_string());
    }

    #[test]
    fn find_mut_locates_task_by_id() {
        let first = ChecklistTask::new("Laptop", false);
        let second = ChecklistTask::new("Badge", true);
        let mut tasks = ChecklistTasks(vec![first, second.clone()]);
        let found = tasks.find_mut(second.id).expect("task present");
        assert!(found.completed);
        assert!(tasks.find_mut(Uuid::new_v4()).is_none());
    }
}
