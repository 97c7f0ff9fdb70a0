use crate::attachment::{AttachmentLocation, UploadTicket, UploadUrlSigner};
use crate::dynamodb::{DynamoDbClient, DynamoDbTodoStore};
use crate::s3::S3UploadUrlSigner;
use crate::store::TodoStore;
use domain::{ImageId, TodoError, TodoId, TodoItem, UpdateTodoRequest, UserId};
use shared::{AppError, Config};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// ToDo テーブルと添付ファイル用ストレージへのアクセス窓口
///
/// 各メソッドはストアへの単発の呼び出しで、失敗はそのまま呼び出し元に返す。
#[derive(Clone)]
pub struct TodoAccess {
    store: Arc<dyn TodoStore>,
    signer: Arc<dyn UploadUrlSigner>,
    location: AttachmentLocation,
}

/// attachmentUrl の書き込みをバックグラウンドで実行した `get_upload_url`
pub struct DetachedUpload {
    pub ticket: UploadTicket,
    /// attachmentUrl 書き込みの完了・失敗を受け取るハンドル
    pub attachment_update: JoinHandle<Result<(), TodoError>>,
}

impl TodoAccess {
    pub fn new(
        store: Arc<dyn TodoStore>,
        signer: Arc<dyn UploadUrlSigner>,
        location: AttachmentLocation,
    ) -> Self {
        Self {
            store,
            signer,
            location,
        }
    }

    /// DynamoDB と S3 を使う本番構成
    pub async fn from_config(config: &Config) -> Self {
        let sdk_config = crate::load_sdk_config(config).await;
        let db = DynamoDbClient::from_sdk_config(&sdk_config, config);
        let signer = S3UploadUrlSigner::from_sdk_config(&sdk_config, config);

        Self::new(
            Arc::new(DynamoDbTodoStore::new(db)),
            Arc::new(signer),
            AttachmentLocation::from_config(config),
        )
    }

    pub async fn from_env() -> Result<Self, AppError> {
        let config = Config::from_env()?;
        Ok(Self::from_config(&config).await)
    }

    pub async fn get_todos(&self, user_id: &UserId) -> Result<Vec<TodoItem>, TodoError> {
        info!(user_id = %user_id, "ToDo一覧を取得中");

        self.store.query_by_user(user_id).await.map_err(|e| {
            error!(user_id = %user_id, error = %e, "ToDo一覧の取得に失敗しました");
            e
        })
    }

    pub async fn create_todo(&self, todo: TodoItem) -> Result<TodoItem, TodoError> {
        info!(
            user_id = %todo.user_id,
            todo_id = %todo.todo_id,
            todo = %serde_json::to_string(&todo).unwrap_or_default(),
            "ToDoを作成中"
        );

        self.store.put(&todo).await.map_err(|e| {
            error!(todo_id = %todo.todo_id, error = %e, "ToDoの作成に失敗しました");
            e
        })?;

        Ok(todo)
    }

    pub async fn update_todo(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        request: &UpdateTodoRequest,
    ) -> Result<(), TodoError> {
        info!(
            user_id = %user_id,
            todo_id = %todo_id,
            name = %request.name,
            due_date = %request.due_date,
            done = request.done,
            "ToDoを更新中"
        );

        self.store
            .update_fields(user_id, todo_id, request)
            .await
            .map_err(|e| {
                error!(todo_id = %todo_id, error = %e, "ToDoの更新に失敗しました");
                e
            })
    }

    pub async fn delete_todo(&self, user_id: &UserId, todo_id: &TodoId) -> Result<(), TodoError> {
        info!(user_id = %user_id, todo_id = %todo_id, "ToDoを削除中");

        self.store.delete(user_id, todo_id).await.map_err(|e| {
            error!(todo_id = %todo_id, error = %e, "ToDoの削除に失敗しました");
            e
        })
    }

    /// 署名付きアップロード URL を発行し、attachmentUrl を書き込んでから返す
    ///
    /// 書き込みに失敗した場合は URL を返さずにエラーにする。
    pub async fn get_upload_url(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
    ) -> Result<UploadTicket, TodoError> {
        let ticket = self.issue_ticket(user_id, todo_id).await?;

        record_attachment(
            self.store.as_ref(),
            user_id,
            todo_id,
            &ticket.attachment_url,
        )
        .await?;

        Ok(ticket)
    }

    /// `get_upload_url` と同じだが attachmentUrl の書き込みを待たない
    ///
    /// 書き込み結果は返り値のハンドルで確認できる。
    pub async fn get_upload_url_detached(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
    ) -> Result<DetachedUpload, TodoError> {
        let ticket = self.issue_ticket(user_id, todo_id).await?;

        let store = Arc::clone(&self.store);
        let user_id = user_id.clone();
        let todo_id = todo_id.clone();
        let attachment_url = ticket.attachment_url.clone();

        let attachment_update = tokio::spawn(async move {
            record_attachment(store.as_ref(), &user_id, &todo_id, &attachment_url).await
        });

        Ok(DetachedUpload {
            ticket,
            attachment_update,
        })
    }

    async fn issue_ticket(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
    ) -> Result<UploadTicket, TodoError> {
        let image_id = ImageId::new();
        info!(
            user_id = %user_id,
            todo_id = %todo_id,
            image_id = %image_id,
            "署名付きアップロードURLを発行中"
        );

        let upload_url = self.signer.presign_put(&image_id).await.map_err(|e| {
            error!(image_id = %image_id, error = %e, "署名付きURLの発行に失敗しました");
            e
        })?;

        Ok(UploadTicket {
            upload_url,
            attachment_url: self.location.url_for(&image_id),
            image_id,
        })
    }
}

async fn record_attachment(
    store: &dyn TodoStore,
    user_id: &UserId,
    todo_id: &TodoId,
    attachment_url: &str,
) -> Result<(), TodoError> {
    match store
        .set_attachment_url(user_id, todo_id, attachment_url)
        .await
    {
        Ok(()) => {
            info!(todo_id = %todo_id, attachment_url, "attachmentUrlを更新しました");
            Ok(())
        }
        Err(e) => {
            error!(todo_id = %todo_id, error = %e, "attachmentUrlの更新に失敗しました");
            Err(e)
        }
    }
}
