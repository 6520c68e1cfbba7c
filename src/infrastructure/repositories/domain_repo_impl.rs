// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::classification::ClassificationResult;
use crate::domain::models::domain_record::{DomainRecord, RecordStatus};
use crate::domain::repositories::domain_repository::{DomainRepository, RepositoryError};
use crate::infrastructure::database::entities::domain as domain_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::Expr, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;
use std::sync::Arc;

/// 域名记录仓库实现
///
/// 基于SeaORM实现。所有状态转换都是带条件的单条 UPDATE，
/// 由数据库保证同一条记录只会被认领一次。
#[derive(Clone)]
pub struct DomainRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl DomainRepositoryImpl {
    /// 创建新的域名记录仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn exists(&self, id: i64) -> Result<bool, RepositoryError> {
        let count = domain_entity::Entity::find_by_id(id)
            .count(self.db.as_ref())
            .await?;
        Ok(count > 0)
    }
}

fn status_value(status: RecordStatus) -> Option<String> {
    status.as_column_value().map(str::to_string)
}

fn status_filter(status: RecordStatus) -> Condition {
    match status.as_column_value() {
        None => Condition::all().add(domain_entity::Column::Status.is_null()),
        Some(value) => Condition::all().add(domain_entity::Column::Status.eq(value)),
    }
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}

impl TryFrom<domain_entity::Model> for DomainRecord {
    type Error = RepositoryError;

    fn try_from(model: domain_entity::Model) -> Result<Self, Self::Error> {
        let status = RecordStatus::from_column_value(model.status.as_deref())?;

        let (result, error_message) = match status {
            RecordStatus::Done => {
                let result = model
                    .data
                    .as_deref()
                    .map(serde_json::from_str::<ClassificationResult>)
                    .transpose()?;
                (result, None)
            }
            RecordStatus::Failed => (None, model.data),
            _ => (None, None),
        };

        Ok(Self {
            id: model.id,
            url: model.url,
            status,
            result,
            error_message,
            started_at: model.started_at,
            completed_at: model.completed_at,
        })
    }
}

#[async_trait]
impl DomainRepository for DomainRepositoryImpl {
    async fn claim_pending(&self, limit: u64) -> Result<Vec<DomainRecord>, RepositoryError> {
        let rows: Vec<(i64, String)> = domain_entity::Entity::find()
            .select_only()
            .column(domain_entity::Column::Id)
            .column(domain_entity::Column::Url)
            .filter(status_filter(RecordStatus::Pending))
            .order_by_asc(domain_entity::Column::Id)
            .limit(limit)
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, url)| DomainRecord::pending(id, url))
            .collect())
    }

    async fn mark_in_progress(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = domain_entity::Entity::update_many()
            .col_expr(
                domain_entity::Column::Status,
                Expr::value(status_value(RecordStatus::InProgress)),
            )
            .col_expr(
                domain_entity::Column::StartedAt,
                Expr::value::<Option<DateTime<FixedOffset>>>(Some(now())),
            )
            .filter(domain_entity::Column::Id.eq(id))
            .filter(status_filter(RecordStatus::Pending))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 1 {
            return Ok(true);
        }

        if self.exists(id).await? {
            Ok(false)
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    async fn commit_done(
        &self,
        id: i64,
        result: &ClassificationResult,
        body: &str,
    ) -> Result<(), RepositoryError> {
        let frameworks = serde_json::to_string(&result.frameworks)?;
        let help_desks = serde_json::to_string(&result.help_desks)?;
        let emails = serde_json::to_string(&result.emails)?;
        let contact_page_links = serde_json::to_string(&result.contact_page_links)?;
        let faq_page_links = serde_json::to_string(&result.faq_page_links)?;
        let data = serde_json::to_string(result)?;

        let update = domain_entity::Entity::update_many()
            .col_expr(
                domain_entity::Column::Status,
                Expr::value(status_value(RecordStatus::Done)),
            )
            .col_expr(domain_entity::Column::Matched, Expr::value(Some(result.matched)))
            .col_expr(domain_entity::Column::Frameworks, Expr::value(Some(frameworks)))
            .col_expr(domain_entity::Column::Helpdesks, Expr::value(Some(help_desks)))
            .col_expr(domain_entity::Column::Emails, Expr::value(Some(emails)))
            .col_expr(
                domain_entity::Column::ContactPageLinks,
                Expr::value(Some(contact_page_links)),
            )
            .col_expr(
                domain_entity::Column::FaqPageLinks,
                Expr::value(Some(faq_page_links)),
            )
            .col_expr(domain_entity::Column::Data, Expr::value(Some(data)))
            .col_expr(domain_entity::Column::Html, Expr::value(Some(body.to_string())))
            .col_expr(
                domain_entity::Column::CompletedAt,
                Expr::value::<Option<DateTime<FixedOffset>>>(Some(now())),
            )
            .filter(domain_entity::Column::Id.eq(id))
            .filter(status_filter(RecordStatus::InProgress))
            .exec(self.db.as_ref())
            .await?;

        if update.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn commit_failed(&self, id: i64, message: &str) -> Result<(), RepositoryError> {
        let update = domain_entity::Entity::update_many()
            .col_expr(
                domain_entity::Column::Status,
                Expr::value(status_value(RecordStatus::Failed)),
            )
            .col_expr(
                domain_entity::Column::Data,
                Expr::value(Some(message.to_string())),
            )
            .col_expr(
                domain_entity::Column::CompletedAt,
                Expr::value::<Option<DateTime<FixedOffset>>>(Some(now())),
            )
            .filter(domain_entity::Column::Id.eq(id))
            .filter(status_filter(RecordStatus::InProgress))
            .exec(self.db.as_ref())
            .await?;

        if update.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<DomainRecord>, RepositoryError> {
        let model = domain_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        model.map(DomainRecord::try_from).transpose()
    }

    async fn reset_stale(&self, older_than: chrono::Duration) -> Result<u64, RepositoryError> {
        let threshold: DateTime<FixedOffset> = (Utc::now() - older_than).into();

        let result = domain_entity::Entity::update_many()
            .col_expr(
                domain_entity::Column::Status,
                Expr::value(status_value(RecordStatus::Pending)),
            )
            .col_expr(
                domain_entity::Column::StartedAt,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
            .filter(status_filter(RecordStatus::InProgress))
            .filter(
                Condition::any()
                    .add(domain_entity::Column::StartedAt.is_null())
                    .add(domain_entity::Column::StartedAt.lte(threshold)),
            )
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn count_by_status(&self) -> Result<HashMap<RecordStatus, u64>, RepositoryError> {
        let mut counts = HashMap::new();
        for status in [
            RecordStatus::Pending,
            RecordStatus::InProgress,
            RecordStatus::Done,
            RecordStatus::Failed,
        ] {
            let count = domain_entity::Entity::find()
                .filter(status_filter(status))
                .count(self.db.as_ref())
                .await?;
            counts.insert(status, count);
        }
        Ok(counts)
    }
}

#[cfg(test)]
#[path = "domain_repo_impl_test.rs"]
mod tests;
